// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt::Display;
use std::fmt::Formatter;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use flipit_core::session::Theme;

use crate::cmd::Context;
use crate::cmd::account;
use crate::cmd::quiz::run_quiz;
use crate::cmd::sets;
use crate::cmd::spawn_status_reporter;
use crate::cmd::theme::set_theme;
use crate::config::Config;
use crate::error::Fallible;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Base URL of the flashcard API. Overrides FLIPIT_API_URL and the config file.
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Directory holding the config and the saved session. Default is ~/.flipit.
    #[arg(long, global = true)]
    state_dir: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an account.
    Register {
        username: String,
        /// The password. Read from standard input when omitted.
        #[arg(long)]
        password: Option<String>,
    },
    /// Sign in and save the session.
    Login {
        username: String,
        /// The password. Read from standard input when omitted.
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the saved session.
    Logout,
    /// Show whether a session is saved, and the theme.
    Status,
    /// Commands relating to sets.
    Sets {
        #[command(subcommand)]
        command: SetCommand,
    },
    /// Commands relating to the cards of a set.
    Cards {
        #[command(subcommand)]
        command: CardCommand,
    },
    /// Quiz yourself on a set.
    Quiz { set_id: String },
    /// Set the theme. Without an argument, switch to the other one.
    Theme { theme: Option<ThemeArg> },
}

#[derive(Subcommand)]
enum SetCommand {
    /// List your sets.
    List,
    /// Print a set and its cards.
    Show { set_id: String },
    /// Create a set.
    Create {
        title: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Change the title or description of a set.
    Update {
        set_id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a set and all of its cards.
    Delete { set_id: String },
}

#[derive(Subcommand)]
enum CardCommand {
    /// Add a card to a set.
    Add {
        set_id: String,
        front: String,
        back: String,
    },
    /// Replace both sides of a card.
    Edit {
        set_id: String,
        card_id: String,
        front: String,
        back: String,
    },
    /// Remove a card from a set.
    Delete { set_id: String, card_id: String },
}

#[derive(ValueEnum, Clone, Copy, PartialEq)]
enum ThemeArg {
    Light,
    Dark,
}

impl Display for ThemeArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ThemeArg::Light => write!(f, "light"),
            ThemeArg::Dark => write!(f, "dark"),
        }
    }
}

impl From<ThemeArg> for Theme {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Light => Theme::Light,
            ThemeArg::Dark => Theme::Dark,
        }
    }
}

pub async fn entrypoint() -> Fallible<()> {
    let cli: Cli = Cli::parse();
    let config = Config::resolve(cli.api_url, cli.state_dir)?;
    let ctx = Context::new(&config)?;
    spawn_status_reporter(ctx.api.client().status().subscribe());
    let had_session = ctx.session.is_authenticated();
    let result = dispatch(&ctx, cli.command).await;
    if result.is_err() && had_session && !ctx.session.is_authenticated() {
        eprintln!("Your session has ended. Run `flipit login <username>` to sign in again.");
    }
    result
}

async fn dispatch(ctx: &Context, command: Command) -> Fallible<()> {
    match command {
        Command::Register { username, password } => {
            account::register(ctx, username, password).await
        }
        Command::Login { username, password } => account::login(ctx, username, password).await,
        Command::Logout => account::logout(ctx),
        Command::Status => {
            account::status(ctx);
            Ok(())
        }
        Command::Sets { command } => match command {
            SetCommand::List => sets::list_sets(ctx).await,
            SetCommand::Show { set_id } => sets::show_set(ctx, set_id).await,
            SetCommand::Create { title, description } => {
                sets::create_set(ctx, title, description).await
            }
            SetCommand::Update {
                set_id,
                title,
                description,
            } => sets::update_set(ctx, set_id, title, description).await,
            SetCommand::Delete { set_id } => sets::delete_set(ctx, set_id).await,
        },
        Command::Cards { command } => match command {
            CardCommand::Add {
                set_id,
                front,
                back,
            } => sets::add_card(ctx, set_id, front, back).await,
            CardCommand::Edit {
                set_id,
                card_id,
                front,
                back,
            } => sets::edit_card(ctx, set_id, card_id, front, back).await,
            CardCommand::Delete { set_id, card_id } => {
                sets::delete_card(ctx, set_id, card_id).await
            }
        },
        Command::Quiz { set_id } => run_quiz(ctx, set_id).await,
        Command::Theme { theme } => set_theme(ctx, theme.map(Theme::from)),
    }
}
