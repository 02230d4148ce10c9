//! Command implementations. Commands that need the signed-in user restore
//! the session first so the stored tokens are validated before use.

use anyhow::{bail, Context, Result};
use tracing::{debug, warn};

use mytube_core::auth::AuthSession;
use mytube_core::config::Config;
use mytube_core::models::{
    ProfileStats, RegisterRequest, UpdateProfileRequest, UploadFile, UserProfile, Video,
    VideoUpload,
};
use mytube_core::utils::format::{format_date, format_time_ago, initials};
use mytube_core::utils::{
    format_file_size, format_number, format_subscriber_count, format_view_count, truncate_string,
};

use crate::cli::{Command, ProfileCommand, RegisterArgs, UploadArgs};

/// Width of the title column in video listings
const TITLE_WIDTH: usize = 48;

pub async fn run(command: Command, auth: &AuthSession, config: &Config) -> Result<()> {
    match command {
        Command::Login { identifier } => login(auth, config, identifier).await?,
        Command::Register(args) => register(auth, args).await?,
        Command::Logout => {
            auth.logout().await;
            println!("Signed out");
        }
        Command::OauthUrl { provider } => {
            println!("{}", auth.api().oauth_authorization_url(&provider));
        }
        Command::OauthComplete { callback } => {
            let user = auth.complete_oauth_redirect(&callback).await?;
            println!("Signed in as {}", user.display_name());
        }
        Command::Whoami => {
            restore(auth).await;
            match auth.current_user() {
                Some(user) => print_profile(&user, None),
                None => println!("Not signed in"),
            }
        }
        Command::Trending { limit } => {
            restore(auth).await;
            let videos = auth.api().trending().await.context("Failed to load trending videos")?;
            print_videos(videos.iter().take(limit));
        }
        Command::Search { query, page, size } => {
            restore(auth).await;
            let results = auth.api().search(&query, page, size).await?;
            print_videos(results.content.iter());
            println!(
                "\npage {} of {} ({} results)",
                results.number + 1,
                results.total_pages.max(1),
                results.total_elements
            );
        }
        Command::Profile(command) => {
            restore(auth).await;
            profile(auth, command).await?;
        }
        Command::Upload(args) => {
            restore(auth).await;
            upload(auth, args).await?;
        }
    }
    Ok(())
}

/// Validate stored tokens (refreshing them if needed) before a command uses them
async fn restore(auth: &AuthSession) {
    let session = auth.restore_session().await;
    debug!(authenticated = session.is_authenticated(), "Session restored");
}

fn require_session(auth: &AuthSession) -> Result<()> {
    if !auth.is_authenticated() {
        bail!("Not signed in. Run `mytube login` first.");
    }
    Ok(())
}

async fn login(auth: &AuthSession, config: &Config, identifier: Option<String>) -> Result<()> {
    let identifier = match identifier.or_else(|| config.last_username.clone()) {
        Some(identifier) => identifier,
        None => bail!("Email or username required: `mytube login <identifier>`"),
    };
    let password = rpassword::prompt_password("Password: ")?;

    let user = auth.login(&identifier, &password).await?;

    if let Err(e) = Config::remember_username(&identifier) {
        warn!(error = %e, "Failed to save config");
    }
    println!("Signed in as {}", user.display_name());
    Ok(())
}

async fn register(auth: &AuthSession, args: RegisterArgs) -> Result<()> {
    let password = rpassword::prompt_password("Password: ")?;
    let confirm = rpassword::prompt_password("Repeat password: ")?;
    if password != confirm {
        bail!("Passwords do not match");
    }

    let request = RegisterRequest {
        email: args.email,
        username: args.username.clone(),
        first_name: args.first_name,
        last_name: args.last_name,
        password,
        birth_date: args.birth_date,
        sex: args.sex,
        phone_number: args.phone_number,
    };
    let user = auth.register(&request).await?;

    if let Err(e) = Config::remember_username(&args.username) {
        warn!(error = %e, "Failed to save config");
    }
    println!("Welcome, {}!", user.display_name());
    Ok(())
}

async fn profile(auth: &AuthSession, command: ProfileCommand) -> Result<()> {
    require_session(auth)?;
    match command {
        ProfileCommand::Show => {
            let api = auth.api();
            let (user, stats) = futures::try_join!(api.profile(), api.profile_stats())?;
            print_profile(&user, Some(&stats));
        }
        ProfileCommand::Stats => {
            let stats = auth.api().profile_stats().await?;
            print_stats(&stats);
        }
        ProfileCommand::Update {
            first_name,
            last_name,
            birth_date,
            sex,
            phone_number,
            avatar_url,
            banner_url,
        } => {
            let update = UpdateProfileRequest {
                first_name,
                last_name,
                birth_date,
                sex,
                phone_number,
                avatar_url,
                banner_url,
            };
            if update.is_empty() {
                bail!("Nothing to update");
            }
            let user = auth.update_profile(&update).await?;
            println!("Profile updated");
            print_profile(&user, None);
        }
        ProfileCommand::Avatar { path } => {
            let avatar = UploadFile::from_path(&path)?;
            auth.api().upload_avatar(&avatar).await?;
            let user = auth.refresh_user().await?;
            println!(
                "Avatar updated: {}",
                user.avatar_url.as_deref().unwrap_or("(pending)")
            );
        }
    }
    Ok(())
}

async fn upload(auth: &AuthSession, args: UploadArgs) -> Result<()> {
    require_session(auth)?;

    let mut upload = VideoUpload::new(UploadFile::from_path(&args.path)?, args.title);
    upload.description = args.description;
    for tag in &args.tags {
        upload.add_tag(tag);
    }
    if let Some(ref thumbnail) = args.thumbnail {
        upload.thumbnail = Some(UploadFile::from_path(thumbnail)?);
    }
    if let Err(reason) = upload.validate() {
        bail!(reason);
    }

    eprintln!(
        "Uploading {} ({})...",
        upload.video.file_name,
        format_file_size(upload.video.size())
    );
    let video = auth.api().upload_video(&upload).await?;
    println!(
        "Uploaded \"{}\" (id {}, status {})",
        video.title,
        video.id,
        video.status.as_deref().unwrap_or("unknown")
    );
    if let Some(ref uploaded) = video.upload_date {
        println!("  uploaded: {}", format_date(uploaded));
    }
    Ok(())
}

fn print_videos<'a>(videos: impl Iterator<Item = &'a Video>) {
    let mut count = 0;
    for video in videos {
        count += 1;
        let uploaded = video
            .upload_date
            .as_deref()
            .map(format_time_ago)
            .unwrap_or_default();
        println!(
            "{:<width$}  {:>8}  {:<20}  {:>12}  {}",
            truncate_string(&video.title, TITLE_WIDTH),
            video.duration_display(),
            truncate_string(video.channel_name(), 20),
            format_view_count(video.view_count),
            uploaded,
            width = TITLE_WIDTH,
        );
    }
    if count == 0 {
        println!("No videos");
    }
}

fn print_profile(user: &UserProfile, stats: Option<&ProfileStats>) {
    println!(
        "[{}] {} (@{})",
        initials(&user.first_name, &user.last_name),
        user.display_name(),
        user.username
    );
    println!("  email:   {}", user.email);
    println!("  role:    {}", user.role);
    if let Some(birth_date) = user.birth_date {
        println!("  born:    {}", birth_date.format("%b %d, %Y"));
    }
    if let Some(ref phone) = user.phone_number {
        println!("  phone:   {}", phone);
    }
    if let Some(created_at) = user.created_at {
        println!("  joined:  {}", created_at.format("%b %d, %Y"));
    }
    if let Some(ref channel) = user.channel {
        println!(
            "  channel: {} - {}, {} videos",
            channel.channel_name,
            format_subscriber_count(channel.subscriber_count),
            channel.video_count
        );
    }
    if let Some(stats) = stats {
        print_stats(stats);
    }
}

fn print_stats(stats: &ProfileStats) {
    println!(
        "  videos: {}  views: {}  subscribers: {}  likes: {}",
        format_number(stats.total_videos),
        format_number(stats.total_views),
        format_number(stats.total_subscribers),
        format_number(stats.total_likes)
    );
}
