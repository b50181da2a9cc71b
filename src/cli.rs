use clap::{Parser, Subcommand};

/// tasknotify: due-date reminders and activity notifications
#[derive(Parser)]
#[command(name = "tasknotify", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the notification API server
    Serve {
        /// Port to bind (defaults to TASKNOTIFY_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Apply pending database migrations and exit
    Migrate,

    /// Inspect a user's notifications
    Notifications {
        #[command(subcommand)]
        command: NotificationCommands,
    },
}

#[derive(Subcommand)]
pub enum NotificationCommands {
    /// List notifications, newest first
    List {
        #[arg(long)]
        user_id: String,
    },
    /// Print the unread count
    Unread {
        #[arg(long)]
        user_id: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_is_allowed() {
        let cli = Cli::try_parse_from(["tasknotify"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parse_notifications_list() {
        let cli = Cli::try_parse_from([
            "tasknotify",
            "notifications",
            "list",
            "--user-id",
            "00000000-0000-0000-0000-000000000001",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Notifications {
                command: NotificationCommands::List { user_id },
            }) => assert_eq!(user_id, "00000000-0000-0000-0000-000000000001"),
            _ => panic!("expected notifications list"),
        }
    }

    #[test]
    fn test_serve_port_flag() {
        let cli = Cli::try_parse_from(["tasknotify", "serve", "--port", "9000"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Serve { port: Some(9000) })));
    }
}
