use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use mytube_core::config::{TokenBackend, ENV_API_URL};
use mytube_core::models::UserSex;

#[derive(Debug, Parser)]
#[command(name = "mytube", version, about = "Command line client for the mytube video platform")]
pub struct Cli {
    /// Backend base URL
    #[arg(long, global = true, env = ENV_API_URL)]
    pub api_url: Option<String>,

    /// Where to keep the token pair: file, keyring or memory
    #[arg(long, global = true)]
    pub token_backend: Option<TokenBackend>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in with an email or username
    Login {
        /// Email or username (defaults to the last one used)
        identifier: Option<String>,
    },
    /// Create an account and sign in
    Register(RegisterArgs),
    /// Sign out and forget the stored tokens
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Print the start URL for an OAuth2 provider login (google, github)
    OauthUrl { provider: String },
    /// Finish an OAuth2 login from the callback URL the browser landed on
    OauthComplete { callback: String },
    /// List trending videos
    Trending {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Search videos
    Search {
        query: String,
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long, default_value_t = mytube_core::api::DEFAULT_PAGE_SIZE)]
        size: u32,
    },
    /// Show or edit the profile
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Upload a video
    Upload(UploadArgs),
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub username: String,
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    /// YYYY-MM-DD
    #[arg(long)]
    pub birth_date: Option<NaiveDate>,
    #[arg(long)]
    pub sex: Option<UserSex>,
    #[arg(long)]
    pub phone_number: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// Profile and statistics
    Show,
    /// Statistics only
    Stats,
    /// Change profile fields; omitted fields are left as they are
    Update {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        /// YYYY-MM-DD
        #[arg(long)]
        birth_date: Option<NaiveDate>,
        #[arg(long)]
        sex: Option<UserSex>,
        #[arg(long)]
        phone_number: Option<String>,
        #[arg(long)]
        avatar_url: Option<String>,
        #[arg(long)]
        banner_url: Option<String>,
    },
    /// Upload a new avatar image
    Avatar { path: PathBuf },
}

#[derive(Debug, Args)]
pub struct UploadArgs {
    pub path: PathBuf,
    #[arg(long)]
    pub title: String,
    #[arg(long, default_value = "")]
    pub description: String,
    #[arg(long = "tag")]
    pub tags: Vec<String>,
    #[arg(long)]
    pub thumbnail: Option<PathBuf>,
}
