use clap::{Args, Parser, Subcommand};
use serde_json::{Value, json};

use mdd::config::ConfigError;
use mdd::routes::Route;
use mdd::views::login::LoginForm;
use mdd::views::new_article::NewArticleForm;
use mdd::views::register::RegisterForm;
use mdd::views::{
    ArticleDetailView, ArticleListView, LoginView, NewArticleView, Next, ProfileView, RegisterView, ThemeListView,
    ViewError,
};
use mdd::{ApiError, AppState, ClientConfig};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("{}", .0.user_message())]
    Api(#[from] ApiError),
    #[error("{0}")]
    View(ViewError),
    #[error("article {0} not found")]
    ArticleNotFound(i64),
    #[error("not signed in; run `mdd login` first")]
    NotSignedIn,
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

impl From<ViewError> for CliError {
    fn from(err: ViewError) -> Self {
        match err {
            ViewError::Api(api) => Self::Api(api),
            other => Self::View(other),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "mdd", about = "MDD themes, articles and comments from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and persist the session token.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "MDD_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and sign in.
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long, env = "MDD_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the persisted token.
    Logout,
    /// Show the signed-in user.
    Whoami,
    Themes(ThemesCommand),
    Articles(ArticlesCommand),
    Comments(CommentsCommand),
    User(UserCommand),
    /// Navigate to an app path and print the route actually reached.
    Open { path: String },
}

#[derive(Args, Debug)]
struct ThemesCommand {
    #[command(subcommand)]
    command: ThemesSubcommand,
}

#[derive(Subcommand, Debug)]
enum ThemesSubcommand {
    List,
    Follow { theme_id: i64 },
    Unfollow { theme_id: i64 },
}

#[derive(Args, Debug)]
struct ArticlesCommand {
    #[command(subcommand)]
    command: ArticlesSubcommand,
}

#[derive(Subcommand, Debug)]
enum ArticlesSubcommand {
    /// Articles from followed themes, newest first.
    List {
        #[arg(long, default_value_t = false)]
        asc: bool,
    },
    Show {
        article_id: i64,
    },
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        theme_id: i64,
        #[arg(long)]
        content: String,
    },
}

#[derive(Args, Debug)]
struct CommentsCommand {
    #[command(subcommand)]
    command: CommentsSubcommand,
}

#[derive(Subcommand, Debug)]
enum CommentsSubcommand {
    List { article_id: i64 },
    Add { article_id: i64, content: String },
}

#[derive(Args, Debug)]
struct UserCommand {
    #[command(subcommand)]
    command: UserSubcommand,
}

#[derive(Subcommand, Debug)]
enum UserSubcommand {
    Show {
        user_id: i64,
    },
    /// Update the signed-in account. Omitted fields keep their value.
    Update {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        tracing::debug!(error = ?err, "command failed");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = ClientConfig::from_env()?;
    let state = AppState::from_config(&config)?;
    tracing::debug!(api_url = %config.api_url, token_path = %config.token_path.display(), "cli starting");

    match cli.command {
        Command::Login { email, password } => run_login(&state, email, password).await,
        Command::Register { email, name, password } => run_register(&state, email, name, password).await,
        Command::Logout => {
            state.session.log_out();
            println!("signed out");
            Ok(())
        }
        Command::Whoami => {
            require_token(&state)?;
            print_json(&serde_json::to_value(state.api.me().await?)?)
        }
        Command::Themes(themes) => run_themes(&state, themes).await,
        Command::Articles(articles) => run_articles(&state, articles).await,
        Command::Comments(comments) => run_comments(&state, comments).await,
        Command::User(user) => run_user(&state, user).await,
        Command::Open { path } => {
            let reached = state.router.navigate(&path).await;
            println!("{reached}");
            Ok(())
        }
    }
}

fn require_token(state: &AppState) -> Result<(), CliError> {
    if state.session.has_token() { Ok(()) } else { Err(CliError::NotSignedIn) }
}

async fn run_login(state: &AppState, email: String, password: String) -> Result<(), CliError> {
    let mut view = LoginView::new(state.api.clone(), state.session.clone());
    view.form = LoginForm { email, password };
    let next = view.submit().await?;
    report_next(state, next).await
}

async fn run_register(state: &AppState, email: String, name: String, password: String) -> Result<(), CliError> {
    let mut view = RegisterView::new(state.api.clone(), state.session.clone());
    view.form = RegisterForm { email, name, password };
    let next = view.submit().await?;
    report_next(state, next).await
}

async fn report_next(state: &AppState, next: Next) -> Result<(), CliError> {
    if let Some(user) = state.session.current_user() {
        println!("signed in as {}", user.username);
    }
    if let Next::Navigate(route) = next {
        tracing::debug!(%route, "post-auth route");
        state.router.navigate_to(route).await;
    }
    Ok(())
}

async fn run_themes(state: &AppState, themes: ThemesCommand) -> Result<(), CliError> {
    require_token(state)?;
    let mut view = ThemeListView::new(state.api.clone());
    view.load().await?;

    match themes.command {
        ThemesSubcommand::List => {
            let rows: Vec<Value> = view
                .items()
                .iter()
                .map(|item| {
                    json!({
                        "id": item.theme.id,
                        "name": item.theme.name,
                        "description": item.theme.description,
                        "followed": item.followed,
                    })
                })
                .collect();
            print_json(&Value::Array(rows))
        }
        ThemesSubcommand::Follow { theme_id } => set_follow(&view, theme_id, true).await,
        ThemesSubcommand::Unfollow { theme_id } => set_follow(&view, theme_id, false).await,
    }
}

async fn set_follow(view: &ThemeListView, theme_id: i64, want: bool) -> Result<(), CliError> {
    let current = view
        .items()
        .iter()
        .find(|i| i.theme.id == Some(theme_id))
        .map(|i| i.followed)
        .ok_or(CliError::View(ViewError::UnknownItem(theme_id)))?;
    let followed = if current == want { current } else { view.change_follow(theme_id).await? };
    println!("theme {theme_id}: {}", if followed { "followed" } else { "not followed" });
    Ok(())
}

async fn run_articles(state: &AppState, articles: ArticlesCommand) -> Result<(), CliError> {
    require_token(state)?;
    match articles.command {
        ArticlesSubcommand::List { asc } => {
            let mut view = ArticleListView::new(state.api.clone());
            view.load().await?;
            if asc {
                view.toggle_sort_order();
            }
            print_json(&serde_json::to_value(view.articles())?)
        }
        ArticlesSubcommand::Show { article_id } => {
            let view = load_detail(state, article_id).await?;
            let mut out = serde_json::to_value(view.article())?;
            if let Value::Object(map) = &mut out {
                map.insert("comments".to_owned(), comment_rows(&view));
            }
            print_json(&out)
        }
        ArticlesSubcommand::Create { title, theme_id, content } => {
            let mut view = NewArticleView::new(state.api.clone());
            view.load().await?;
            view.form = NewArticleForm { title, content, theme_id: Some(theme_id) };
            view.submit().await?;
            println!("article published");
            Ok(())
        }
    }
}

async fn load_detail(state: &AppState, article_id: i64) -> Result<ArticleDetailView, CliError> {
    let mut view = ArticleDetailView::new(state.api.clone(), article_id);
    match view.load().await {
        Next::Navigate(Route::NotFound) => Err(CliError::ArticleNotFound(article_id)),
        _ => Ok(view),
    }
}

fn comment_rows(view: &ArticleDetailView) -> Value {
    view.comments()
        .iter()
        .map(|entry| {
            json!({
                "id": entry.comment.id,
                "content": entry.comment.content,
                "createdAt": entry.comment.created_at,
                "author": entry.author.as_ref().map(|u| u.username.clone()),
            })
        })
        .collect()
}

async fn run_comments(state: &AppState, comments: CommentsCommand) -> Result<(), CliError> {
    require_token(state)?;
    match comments.command {
        CommentsSubcommand::List { article_id } => {
            let view = load_detail(state, article_id).await?;
            print_json(&comment_rows(&view))
        }
        CommentsSubcommand::Add { article_id, content } => {
            let mut view = load_detail(state, article_id).await?;
            view.comment_draft = content;
            view.add_comment().await?;
            print_json(&comment_rows(&view))
        }
    }
}

async fn run_user(state: &AppState, user: UserCommand) -> Result<(), CliError> {
    require_token(state)?;
    match user.command {
        UserSubcommand::Show { user_id } => print_json(&serde_json::to_value(state.api.user(user_id).await?)?),
        UserSubcommand::Update { username, email, password } => {
            let mut view = ProfileView::new(state.api.clone(), state.session.clone());
            view.load().await?;
            if let Some(username) = username {
                view.form.username = username;
            }
            if let Some(email) = email {
                view.form.email = email;
            }
            if let Some(password) = password {
                view.form.password = password;
            }
            view.submit().await?;
            println!("profile updated");
            Ok(())
        }
    }
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
