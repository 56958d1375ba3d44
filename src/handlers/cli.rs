//! Command-line surface for `aigram`.

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "aigram", version, about = "Aigram social feed client", long_about = None)]
pub struct Cli {
    /// Sign in with this email before running the command
    #[arg(long, global = true, env = "AIGRAM_EMAIL")]
    pub email: Option<String>,

    /// Password for --email (env only is safer than the flag)
    #[arg(long, global = true, env = "AIGRAM_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an account (uses --email and --password) and sign in
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        username: String,
    },
    /// Show the signed-in user's profile document
    Whoami,
    /// End the current session
    Signout,
    /// Latest posts by creation time
    Recent,
    /// The infinite feed, newest update first
    Feed {
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Search post captions
    Search { term: String },
    /// Single-post actions
    Post(PostArgs),
    /// List users, newest first
    Users {
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Single-user actions
    User(UserArgs),
}

#[derive(Parser, Debug)]
pub struct PostArgs {
    #[command(subcommand)]
    pub action: PostCmd,
}

#[derive(Subcommand, Debug)]
pub enum PostCmd {
    /// Show a post by id
    Show { id: String },
    /// Create a post as the signed-in user
    Create {
        #[arg(long)]
        caption: String,
        /// Image path, or a data: URL with a base64 payload
        #[arg(long)]
        file: String,
        #[arg(long)]
        location: Option<String>,
        /// Comma separated
        #[arg(long)]
        tags: Option<String>,
    },
    /// Update a post; omitted fields keep their current value
    Update {
        id: String,
        #[arg(long)]
        caption: Option<String>,
        /// Replacement image path or data: URL
        #[arg(long)]
        file: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        tags: Option<String>,
    },
    /// Delete a post and its image
    Delete { id: String },
    /// Like or unlike a post as the signed-in user
    Like { id: String },
    /// Save or unsave a post as the signed-in user
    Save { id: String },
}

#[derive(Parser, Debug)]
pub struct UserArgs {
    #[command(subcommand)]
    pub action: UserCmd,
}

#[derive(Subcommand, Debug)]
pub enum UserCmd {
    /// Show a user by id
    Show { id: String },
    /// Update a profile; defaults to the signed-in user
    Update {
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        /// New avatar path or data: URL
        #[arg(long)]
        file: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_nested_post_commands() {
        let cli = Cli::try_parse_from([
            "aigram", "--email", "a@b.c", "post", "update", "p1", "--caption", "new",
        ])
        .unwrap();
        assert_eq!(cli.email.as_deref(), Some("a@b.c"));
        match cli.command {
            Commands::Post(PostArgs {
                action: PostCmd::Update { id, caption, file, .. },
            }) => {
                assert_eq!(id, "p1");
                assert_eq!(caption.as_deref(), Some("new"));
                assert!(file.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn feed_defaults_to_one_page() {
        let cli = Cli::try_parse_from(["aigram", "feed"]).unwrap();
        assert!(matches!(cli.command, Commands::Feed { pages: 1 }));
    }
}
