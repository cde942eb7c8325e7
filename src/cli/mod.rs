use clap::Subcommand;

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Chat interactively (the default)
    Chat {
        /// Continue a saved session instead of starting a new one
        #[arg(short, long)]
        session: Option<String>,
    },

    /// Ask a single question and print the reply
    Ask {
        query: String,

        /// Append the turn to a saved session
        #[arg(short, long)]
        session: Option<String>,
    },

    /// List saved sessions
    Sessions,

    /// Print the messages of a saved session
    History {
        session_id: String,
    },
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Chat { session: None }
    }
}
