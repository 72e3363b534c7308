//! Interactive session: parses player actions and drives the world.

use anyhow::{Context, Result};
use art_gallery_core::{Command, Event, GenerationTuning, Point, Settings};
use art_gallery_system_metrics::Metrics;
use art_gallery_world::{apply, query, World};
use clap::{CommandFactory, Parser, Subcommand};
use tracing::debug;

use crate::{
    dashboard,
    layout_transfer::{GalleryLayout, LayoutGuard},
};

#[derive(Debug, Parser)]
#[command(
    name = "gallery",
    no_binary_name = true,
    disable_help_flag = true,
    disable_help_subcommand = true,
    disable_version_flag = true
)]
struct ActionLine {
    #[command(subcommand)]
    action: Action,
}

/// A single line of player input.
#[derive(Clone, Debug, PartialEq, Subcommand)]
pub(crate) enum Action {
    /// Station a guard at the given coordinates.
    Add {
        /// Horizontal coordinate.
        #[arg(allow_negative_numbers = true)]
        x: f64,
        /// Vertical coordinate.
        #[arg(allow_negative_numbers = true)]
        y: f64,
    },
    /// Remove the most recently placed guard.
    Undo,
    /// Remove every guard.
    Clear,
    /// Generate a new floor plan, optionally from a fixed seed.
    New {
        /// Seed for the floor-plan generator.
        seed: Option<u64>,
    },
    /// Show the dashboard again.
    Status,
    /// Draw the floor plan.
    Map,
    /// Print a code that reproduces the current game.
    Export,
    /// Rebuild a game from an exported code.
    Import {
        /// Code printed by `export`.
        code: String,
    },
    /// List the available actions.
    Help,
    /// Leave the gallery.
    #[command(alias = "exit")]
    Quit,
}

/// Parses one line of player input.
pub(crate) fn parse_action(line: &str) -> Result<Action, clap::Error> {
    ActionLine::try_parse_from(line.split_whitespace()).map(|parsed| parsed.action)
}

/// Help text listing every action.
pub(crate) fn help_text() -> String {
    let mut command = ActionLine::command();
    command.render_help().to_string()
}

/// What the adapter should do after an action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// Print the message and keep reading input.
    Continue(String),
    /// Stop the session.
    Quit,
}

/// One player's game, owning the world and the metrics system.
#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    metrics: Metrics,
    settings: Settings,
    seed: u64,
    placements: Vec<Point>,
}

impl Session {
    /// Creates a session and starts the first game.
    pub(crate) fn start(tuning: GenerationTuning, settings: Settings, seed: u64) -> Result<Self> {
        let mut session = Self {
            world: World::with_tuning(tuning),
            metrics: Metrics::new(),
            settings,
            seed,
            placements: Vec::new(),
        };
        let events = session.submit(Command::NewGame { settings, seed })?;
        if let Some(reason) = events.iter().find_map(|event| match event {
            Event::NewGameRejected { reason } => Some(*reason),
            _ => None,
        }) {
            return Err(reason).context("could not start the first game");
        }
        Ok(session)
    }

    /// Welcome banner followed by the dashboard.
    pub(crate) fn greeting(&self) -> String {
        format!(
            "{}\n\n{}",
            query::welcome_banner(&self.world),
            self.dashboard()
        )
    }

    /// Executes one action. Errors are internal failures that end the session.
    pub(crate) fn execute(&mut self, action: Action) -> Result<Outcome> {
        let message = match action {
            Action::Add { x, y } => {
                let position = Point::new(x, y);
                let events = self.submit(Command::AddGuard { position })?;
                self.describe(&events)
            }
            Action::Undo => {
                let events = self.submit(Command::RemoveLastGuard)?;
                if events.is_empty() {
                    "There are no guards to remove.".to_owned()
                } else {
                    self.describe(&events)
                }
            }
            Action::Clear => {
                let events = self.submit(Command::RemoveAllGuards)?;
                self.describe(&events)
            }
            Action::New { seed } => {
                let seed = seed.unwrap_or_else(rand::random);
                let settings = self.settings;
                let events = self.submit(Command::NewGame { settings, seed })?;
                if events
                    .iter()
                    .any(|event| matches!(event, Event::GameStarted { .. }))
                {
                    self.seed = seed;
                }
                self.describe(&events)
            }
            Action::Status => self.dashboard(),
            Action::Map => dashboard::render_map(&self.world)
                .unwrap_or_else(|| "No floor plan yet.".to_owned()),
            Action::Export => self.export()?,
            Action::Import { code } => match GalleryLayout::decode(&code) {
                Ok(layout) => self.import(layout)?,
                Err(error) => format!("Could not import layout: {error}"),
            },
            Action::Help => help_text(),
            Action::Quit => return Ok(Outcome::Quit),
        };
        Ok(Outcome::Continue(message))
    }

    fn dashboard(&self) -> String {
        dashboard::render_dashboard(&self.world, self.metrics.last_report())
    }

    fn export(&self) -> Result<String> {
        let layout = GalleryLayout {
            settings: self.settings,
            seed: self.seed,
            guards: self.placements.iter().copied().map(LayoutGuard::from).collect(),
        };
        layout.encode().context("failed to export layout")
    }

    fn import(&mut self, layout: GalleryLayout) -> Result<String> {
        let mut replay = Self {
            world: World::with_tuning(*query::tuning(&self.world)),
            metrics: Metrics::new(),
            settings: layout.settings,
            seed: layout.seed,
            placements: Vec::new(),
        };

        let mut events = replay.submit(Command::NewGame {
            settings: layout.settings,
            seed: layout.seed,
        })?;
        for guard in &layout.guards {
            events.extend(replay.submit(Command::AddGuard {
                position: Point::from(*guard),
            })?);
        }

        let rejection = events.iter().find_map(|event| match event {
            Event::NewGameRejected { reason } => Some(reason.to_string()),
            Event::GuardPlacementRejected { reason, .. } => Some(reason.to_string()),
            _ => None,
        });
        if let Some(reason) = rejection {
            return Ok(format!("Could not import layout: {reason}"));
        }

        *self = replay;
        Ok(format!("Layout imported.\n{}", self.dashboard()))
    }

    fn submit(&mut self, command: Command) -> Result<Vec<Event>> {
        let mut events = Vec::new();
        apply(&mut self.world, command, &mut events)
            .context("the gallery could not be updated")?;

        for event in &events {
            match event {
                Event::GameStarted { settings, .. } => {
                    self.settings = *settings;
                    self.placements.clear();
                }
                Event::GuardPlaced { position, .. } => self.placements.push(*position),
                Event::GuardRemoved { .. } => {
                    let _ = self.placements.pop();
                }
                Event::GuardsCleared { .. } => self.placements.clear(),
                _ => {}
            }
        }

        let mut published = Vec::new();
        self.metrics
            .handle(&events, query::metrics_inputs(&self.world), &mut published);
        debug!(
            events = events.len(),
            published = published.len(),
            "processed command"
        );
        events.extend(published);
        Ok(events)
    }

    fn describe(&self, events: &[Event]) -> String {
        let mut lines = Vec::new();
        let mut changed = false;
        for event in events {
            match event {
                Event::GameStarted { floor_area, .. } => {
                    changed = true;
                    lines.push(format!(
                        "New floor plan generated (area {floor_area:.2}, seed {}).",
                        self.seed
                    ));
                }
                Event::NewGameRejected { reason } => lines.push(reason.to_string()),
                Event::GuardPlaced { guard, position } => {
                    changed = true;
                    lines.push(format!(
                        "Guard #{guard} stationed at ({:.2}, {:.2}).",
                        position.x(),
                        position.y()
                    ));
                }
                Event::GuardPlacementRejected { reason, .. } => lines.push(reason.to_string()),
                Event::GuardRemoved { guard } => {
                    changed = true;
                    lines.push(format!("Guard #{guard} removed."));
                }
                Event::GuardsCleared { removed } => {
                    changed = true;
                    lines.push(format!("Removed {removed} guard(s)."));
                }
                Event::GameFinished => {
                    lines.push("Every guard is in position.".to_owned());
                }
                Event::MetricsUpdated { .. } => {}
            }
        }
        if changed {
            lines.push(String::new());
            lines.push(self.dashboard());
        }
        lines.join("\n")
    }

    #[cfg(test)]
    fn world(&self) -> &World {
        &self.world
    }
}
