use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::error;
use ore_core::plugin_manager::Result;
use ore_core::ui_bridge::{MessageSeverity, Messenger};
use ore_core::{HostSnapshot, OreClient, PluginHost, RECOMMENDED_VERSION};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Console messenger: progress on stdout, warnings on stderr
#[derive(Debug, Default)]
pub struct ConsoleMessenger;

impl Messenger for ConsoleMessenger {
    fn deliver_message(&self, severity: MessageSeverity, message: &str) {
        match severity {
            MessageSeverity::Info => println!("{}", message),
            MessageSeverity::Warning => eprintln!("{}", message),
        }
    }
}

/// Requests accepted both on the command line and inside `ore shell`
#[derive(Subcommand, Debug, Clone)]
pub enum Action {
    /// Search the catalog
    Search {
        /// Free-text query
        query: String,
    },
    /// Show a project from the catalog
    Info {
        /// Plugin ID
        id: String,
    },
    /// Show a catalog user
    User {
        /// Username
        name: String,
    },
    /// Download a plugin into the downloads directory without installing it
    Download {
        id: String,
        #[arg(long, default_value = RECOMMENDED_VERSION)]
        version: String,
    },
    /// List loaded plugins with a newer recommended version
    Updates,
    /// Show the state of one plugin, or of every known plugin
    Status {
        id: Option<String>,
    },
    /// Install a plugin and its dependencies
    Install {
        id: String,
        #[arg(long, default_value = RECOMMENDED_VERSION)]
        version: String,
        /// Do not install dependencies
        #[arg(long)]
        no_deps: bool,
        /// Skip the platform API version check for this plugin
        #[arg(long)]
        ignore_platform: bool,
    },
    /// Remove a plugin
    Uninstall {
        id: String,
    },
    /// Update a plugin
    Update {
        id: String,
        #[arg(long, default_value = RECOMMENDED_VERSION)]
        version: String,
    },
}

/// One line typed into the shell
#[derive(Parser, Debug)]
#[command(name = "ore", no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    action: Action,
}

/// A sequence of requests against one client.
///
/// Staged changes are materialized when the session finishes, which is the
/// safe point for a standalone tool: no host holds the files open meanwhile.
/// The host snapshot is then rewritten to match the installation directory.
pub struct Session {
    client: OreClient,
    host: HostSnapshot,
    host_path: PathBuf,
}

impl Session {
    pub fn new(client: OreClient, host: HostSnapshot, host_path: PathBuf) -> Self {
        Self {
            client,
            host,
            host_path,
        }
    }

    pub async fn run(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Search { query } => {
                let projects = self.client.search_projects(&query).await?;
                if projects.is_empty() {
                    println!("No projects match '{}'.", query);
                }
                for project in projects {
                    println!(
                        "{} ({}) v{} - {}",
                        project.plugin_id,
                        project.name,
                        project.recommended_version.name,
                        project.description.as_deref().unwrap_or("")
                    );
                }
            }
            Action::Info { id } => match self.client.project(&id).await? {
                Some(project) => {
                    println!("{} ({})", project.name, project.plugin_id);
                    if let Some(owner) = &project.owner {
                        println!("  Owner: {}", owner);
                    }
                    if let Some(description) = &project.description {
                        println!("  {}", description);
                    }
                    println!("  Recommended version: {}", project.recommended_version.name);
                    println!(
                        "  Downloads: {}  Stars: {}  Views: {}",
                        project.downloads, project.stars, project.views
                    );
                    println!("  Status: {}", self.client.ledger_state(&id));
                }
                None => println!("No project with ID '{}'.", id),
            },
            Action::User { name } => match self.client.user(&name).await? {
                Some(user) => {
                    println!("{}", user.username);
                    if !user.roles.is_empty() {
                        println!("  Roles: {}", user.roles.join(", "));
                    }
                    for project in &user.projects {
                        println!("  - {} v{}", project.plugin_id, project.recommended_version.name);
                    }
                }
                None => println!("No user named '{}'.", name),
            },
            Action::Download { id, version } => {
                let path = self.client.download_plugin(&id, &version).await?;
                println!("Saved to {}", path.display());
            }
            Action::Updates => {
                let updates = self.client.available_updates().await?;
                if updates.is_empty() {
                    println!("All plugins are up to date.");
                }
                for update in updates {
                    println!("{}", update);
                }
            }
            Action::Status { id: Some(id) } => {
                println!("{}: {}", id, self.client.ledger_state(&id));
            }
            Action::Status { id: None } => self.print_status(),
            Action::Install {
                id,
                version,
                no_deps,
                ignore_platform,
            } => {
                self.client.install_plugin(&id, &version, !no_deps, ignore_platform).await?;
                println!("{}: {}", id, self.client.ledger_state(&id));
            }
            Action::Uninstall { id } => {
                self.client.uninstall_plugin(&id).await?;
                println!("{}: {}", id, self.client.ledger_state(&id));
            }
            Action::Update { id, version } => {
                self.client.update_plugin(&id, &version).await?;
                println!("{}: {}", id, self.client.ledger_state(&id));
            }
        }
        Ok(())
    }

    fn print_status(&self) {
        let mut ids: Vec<String> = self
            .client
            .host()
            .loaded_plugins()
            .into_iter()
            .map(|plugin| plugin.id)
            .collect();
        ids.extend(self.client.ledger().new_install_ids());
        ids.sort();
        ids.dedup();

        println!("Installation directory: {}", self.client.installation_dir().display());
        if ids.is_empty() {
            println!("No plugins installed.");
        }
        for id in ids {
            match self.client.installation(&id) {
                Some(installation) => {
                    println!("{} v{}: {}", id, installation.version(), self.client.ledger_state(&id))
                }
                None => println!("{}: {}", id, self.client.ledger_state(&id)),
            }
        }
        println!(
            "Pending updates: {}, pending removals: {}",
            self.client.uninstalled_update_count(),
            self.client.pending_uninstall_count()
        );
    }

    /// Read requests from stdin until `exit` or end of input.
    ///
    /// A failed request is reported and the shell keeps going.
    pub async fn shell(&mut self) -> std::io::Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        println!("Type 'help' for the list of commands, 'exit' to finish.");

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            match line {
                "" => continue,
                "exit" | "quit" => break,
                _ => {}
            }

            match ShellLine::try_parse_from(line.split_whitespace()) {
                Ok(parsed) => {
                    if let Err(e) = self.run(parsed.action).await {
                        if !e.is_user_error() {
                            error!("Request failed: {:?}", e);
                        }
                        eprintln!("Error: {}", e);
                    }
                }
                Err(e) => {
                    let _ = e.print();
                }
            }
        }
        Ok(())
    }

    /// Apply staged updates, complete pending removals and save the host
    /// snapshot.
    ///
    /// The updates directory is purged even when nothing was staged.
    pub async fn finish(mut self) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let changes = self.client.commit_pending_changes().await?;
        if !changes.updated.is_empty() {
            println!("Applied {} update(s).", changes.updated.len());
        }
        if !changes.removed.is_empty() {
            println!("Removed {} plugin(s).", changes.removed.len());
        }

        if !changes.is_empty() {
            changes.record_in(&mut self.host);
            self.host.save(&self.host_path)?;
        }
        Ok(())
    }
}
