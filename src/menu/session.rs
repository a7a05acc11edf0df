use crate::news::{Article, Source, SourceSelection};
use crate::storage::{CredentialError, SavedArticle, UserId};

use super::console::{Console, MenuError, INVALID};
use super::selection::{describe_selection, parse_position, parse_source_choice};
use super::services::{Accounts, NewsSearch, SavedArticles};

/// Main menu entries. Which number maps to which entry depends on whether
/// someone is logged in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MainAction {
    Sources,
    Search,
    Saved,
    Login,
    Logout,
    Quit,
}

const LOGGED_OUT_MENU: [(u32, &str, MainAction); 4] = [
    (1, "News sources", MainAction::Sources),
    (2, "Search articles", MainAction::Search),
    (3, "Login", MainAction::Login),
    (0, "Quit", MainAction::Quit),
];

const LOGGED_IN_MENU: [(u32, &str, MainAction); 5] = [
    (1, "News sources", MainAction::Sources),
    (2, "Search articles", MainAction::Search),
    (3, "View saved articles", MainAction::Saved),
    (4, "Logout", MainAction::Logout),
    (0, "Quit", MainAction::Quit),
];

/// One interactive run of the program.
///
/// Holds the logged-in user (if any) and the current source filter. Lists
/// fetched for display live only as long as the menu that shows them; the
/// numbers the user types refer to positions in those lists.
pub struct Session<S, N> {
    console: Console,
    store: S,
    news: N,
    user: Option<UserId>,
    selection: SourceSelection,
}

impl<S, N> Session<S, N>
where
    S: Accounts + SavedArticles,
    N: NewsSearch,
{
    pub fn new(console: Console, store: S, news: N) -> Self {
        Self {
            console,
            store,
            news,
            user: None,
            selection: SourceSelection::All,
        }
    }

    pub fn user(&self) -> Option<UserId> {
        self.user
    }

    pub fn selection(&self) -> &SourceSelection {
        &self.selection
    }

    /// Run menus until the user quits or input ends.
    pub async fn run(&mut self) -> Result<(), MenuError> {
        match self.main_loop().await {
            Err(MenuError::InputClosed) => {
                tracing::debug!("Input closed, ending session");
                self.console.success("Goodbye!")
            }
            other => other,
        }
    }

    async fn main_loop(&mut self) -> Result<(), MenuError> {
        self.console.greeting()?;

        loop {
            match self.main_menu()? {
                MainAction::Sources => self.sources_menu().await?,
                MainAction::Search => self.search_menu().await?,
                MainAction::Saved => self.saved_menu().await?,
                MainAction::Login => self.login_menu().await?,
                MainAction::Logout => {
                    tracing::info!(user_id = ?self.user, "User logged out");
                    self.user = None;
                    self.console.success("You have logged out!")?;
                }
                MainAction::Quit => {
                    self.console.success("Goodbye!")?;
                    return Ok(());
                }
            }
        }
    }

    fn main_menu(&mut self) -> Result<MainAction, MenuError> {
        let options: &[(u32, &str, MainAction)] = if self.user.is_some() {
            &LOGGED_IN_MENU
        } else {
            &LOGGED_OUT_MENU
        };
        self.console.choose("MENU", options)
    }

    // ========================================================================
    // Sources
    // ========================================================================

    async fn sources_menu(&mut self) -> Result<(), MenuError> {
        let sources: Vec<Source> = match self.news.sources().await {
            Ok(sources) => sources,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load sources");
                return self.console.error(&format!("Could not load sources: {e}"));
            }
        };
        self.console
            .info(&format!("{} sources available!", sources.len()))?;

        loop {
            let choice = self.console.menu(
                "SOURCES",
                &[(1, "View sources"), (2, "Choose sources"), (0, "Go back")],
            )?;
            match choice {
                1 => {
                    self.console
                        .numbered(sources.iter().map(|s| s.name.as_str()))?;
                    let current = describe_selection(&self.selection, &sources);
                    self.console
                        .highlight(&format!("Current sources: {current}"))?;
                }
                2 => {
                    let input = self
                        .console
                        .prompt_non_empty("Enter comma separated list of source #s (or `All`)")?;
                    match parse_source_choice(&input, &sources) {
                        Some(selection) => {
                            tracing::debug!(selection = ?selection, "Source selection changed");
                            self.selection = selection;
                            self.console.success("Sources set!")?;
                        }
                        None => self.console.error(INVALID)?,
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    // ========================================================================
    // Search
    // ========================================================================

    async fn search_menu(&mut self) -> Result<(), MenuError> {
        let term = self.console.prompt_non_empty("Enter a term")?;
        let articles = match self.news.headlines(&term, &self.selection).await {
            Ok(articles) => articles,
            Err(e) => {
                tracing::warn!(error = %e, "Search failed");
                return self.console.error(&format!("Search failed: {e}"));
            }
        };

        if articles.is_empty() {
            return self.console.error("No results.");
        }
        self.console
            .info(&format!("{} results!", articles.len()))?;

        loop {
            let choice = self.console.menu(
                "RESULTS",
                &[(1, "View results"), (2, "Choose article"), (0, "Go back")],
            )?;
            match choice {
                1 => self
                    .console
                    .numbered(articles.iter().map(|a| a.title.as_str()))?,
                2 => {
                    let input = self.console.prompt("Enter the article #")?;
                    match parse_position(&input, articles.len()) {
                        Some(index) => self.result_menu(&articles[index]).await?,
                        None => self.console.error(INVALID)?,
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    /// Details of one search result; saving is offered only when logged in.
    async fn result_menu(&mut self, article: &Article) -> Result<(), MenuError> {
        self.console.article_details(article)?;

        let Some(user) = self.user else {
            self.console.menu("ARTICLE", &[(0, "Go back")])?;
            return Ok(());
        };

        let choice = self
            .console
            .menu("ARTICLE", &[(1, "Save article"), (0, "Go back")])?;
        if choice == 1 {
            match self.store.save(user, article).await {
                Ok(_) => self.console.success("Article saved!")?,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to save article");
                    self.console
                        .error(&format!("Could not save article: {e}"))?;
                }
            }
        }
        Ok(())
    }

    // ========================================================================
    // Saved Articles
    // ========================================================================

    async fn saved_menu(&mut self) -> Result<(), MenuError> {
        let Some(user) = self.user else {
            return Ok(());
        };
        let mut announced = false;

        loop {
            let saved = match self.store.saved(user).await {
                Ok(saved) => saved,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to load saved articles");
                    return self
                        .console
                        .error(&format!("Could not load saved articles: {e}"));
                }
            };
            if saved.is_empty() {
                return self.console.error("None saved.");
            }
            if !announced {
                self.console.info(&format!("{} saved!", saved.len()))?;
                announced = true;
            }

            let choice = self.console.menu(
                "SAVED",
                &[(1, "View saved"), (2, "Choose article"), (0, "Go back")],
            )?;
            match choice {
                1 => {
                    let titles: Vec<String> = saved.iter().map(saved_title).collect();
                    self.console.numbered(titles.iter().map(String::as_str))?;
                }
                2 => {
                    let input = self.console.prompt("Enter the article #")?;
                    match parse_position(&input, saved.len()) {
                        Some(index) => self.saved_article_menu(user, &saved[index]).await?,
                        None => self.console.error(INVALID)?,
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    async fn saved_article_menu(
        &mut self,
        user: UserId,
        saved: &SavedArticle,
    ) -> Result<(), MenuError> {
        match saved.article() {
            Ok(article) => self.console.article_details(&article)?,
            Err(e) => {
                tracing::warn!(saved_id = saved.id, error = %e, "Saved article payload unreadable");
                self.console.error("This saved article could not be read.")?;
            }
        }

        let choice = self
            .console
            .menu("ARTICLE", &[(1, "Remove article"), (0, "Go back")])?;
        if choice == 1 {
            match self.store.remove(user, saved.id).await {
                Ok(true) => self.console.success("Article removed!")?,
                Ok(false) => self.console.error("Article was already removed.")?,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to remove saved article");
                    self.console
                        .error(&format!("Could not remove article: {e}"))?;
                }
            }
        }
        Ok(())
    }

    // ========================================================================
    // Accounts
    // ========================================================================

    async fn login_menu(&mut self) -> Result<(), MenuError> {
        loop {
            let choice = self.console.menu(
                "LOGIN",
                &[(1, "Enter credentials"), (2, "Create account"), (0, "Go back")],
            )?;
            if choice == 0 {
                return Ok(());
            }

            let username = self.console.prompt("Enter username")?;
            let password = self.console.prompt_password("Enter password")?;

            let (result, welcome) = if choice == 1 {
                (self.store.login(&username, &password).await, "Welcome back!")
            } else {
                (
                    self.store.register(&username, &password).await,
                    "Account created!",
                )
            };

            match result {
                Ok(user) => {
                    self.user = Some(user);
                    return self.console.success(welcome);
                }
                Err(CredentialError::Storage(e)) => {
                    tracing::warn!(error = %e, "Account storage failure");
                    self.console
                        .error("Could not reach the account store. Please try again.")?;
                }
                Err(e) => self.console.error(&e.to_string())?,
            }
        }
    }
}

fn saved_title(saved: &SavedArticle) -> String {
    saved
        .article()
        .map(|a| a.title)
        .unwrap_or_else(|_| "(unreadable article)".to_string())
}
