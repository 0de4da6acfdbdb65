//! Interactive terminal driver for the herald notification queue.
//!
//! Every stdin line is either a message to enqueue or a `:command` that plays
//! the part of the user: hovering, clicking, pausing, or hiding the surface.

mod command;
mod config;
mod surface;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use herald_queue::{Action, ActionOutcome, EnqueueOutcome, MessageSpec, NotificationQueue, PauseGuard, QueueEvent, SurfaceAttachment};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing::info;

use crate::command::{Command, HELP};
use crate::surface::TerminalSurface;

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "herald")]
#[command(about = "Show timed notifications typed on stdin")]
struct Args {
	/// TOML settings file
	#[arg(short, long, value_name = "PATH")]
	config: Option<PathBuf>,

	/// Minimum display time for each message, overriding the settings file
	#[arg(short, long, value_name = "MS")]
	duration_ms: Option<u64>,

	/// Verbose logging
	#[arg(short, long)]
	verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	setup_tracing(args.verbose);

	let mut settings = config::load(args.config.as_deref())?;
	if let Some(ms) = args.duration_ms {
		settings.queue = settings.queue.default_duration(Duration::from_millis(ms));
	}

	let queue = NotificationQueue::new(settings.queue.clone()).context("invalid queue configuration")?;
	let surface = Arc::new(TerminalSurface::new(settings.surface.clone()));
	let attachment = queue.attach(Arc::clone(&surface));
	tokio::spawn(report_events(queue.subscribe()));

	info!(config = ?queue.config(), "herald started");
	println!("{HELP}");

	let mut session = Session {
		queue: &queue,
		surface: &surface,
		attachment: &attachment,
		holds: Vec::new(),
	};
	let mut lines = BufReader::new(tokio::io::stdin()).lines();
	while let Some(line) = lines.next_line().await? {
		match Command::parse(&line) {
			Ok(Some(Command::Quit)) => break,
			Ok(Some(command)) => session.run(command),
			Ok(None) => {}
			Err(err) => eprintln!("{err}"),
		}
	}

	drop(session);
	attachment.detach();
	queue.shutdown().await;
	Ok(())
}

/// State carried between input lines.
struct Session<'a> {
	queue: &'a NotificationQueue<String>,
	surface: &'a TerminalSurface,
	attachment: &'a SurfaceAttachment<String>,
	holds: Vec<PauseGuard>,
}

impl Session<'_> {
	fn run(&mut self, command: Command) {
		match command {
			Command::Message {
				text,
				primary,
				secondary,
				promote,
			} => self.enqueue(text, primary, secondary, promote),
			Command::Pause => {
				self.holds.push(self.queue.pause());
				println!("paused ({} holds)", self.holds.len());
			}
			Command::Resume => match self.holds.pop() {
				Some(hold) => {
					hold.release();
					println!("released ({} holds left)", self.holds.len());
				}
				None => println!("not paused"),
			},
			Command::Hover => self.attachment.pointer_entered(),
			Command::Leave => self.attachment.pointer_left(),
			Command::Click => report_click(self.attachment.primary_clicked()),
			Command::ClickSecondary => report_click(self.attachment.secondary_clicked()),
			Command::Hide => self.surface.set_live(false),
			Command::Show => self.surface.set_live(true),
			Command::Clear => println!("dropped {} pending", self.queue.clear()),
			Command::Status => println!("{:?}", self.queue),
			Command::Help => println!("{HELP}"),
			Command::Quit => {}
		}
	}

	fn enqueue(&self, text: String, primary: Option<String>, secondary: Option<String>, promote: bool) {
		let mut spec = MessageSpec::new(text);
		if let Some(label) = primary {
			spec = spec.primary(echo_action(label));
		}
		if let Some(label) = secondary {
			spec = spec.secondary(echo_action(label));
		}
		if promote {
			spec = spec.promote();
		}
		match self.queue.enqueue(spec) {
			Ok(EnqueueOutcome::Discarded) => println!("(duplicate, dropped)"),
			Ok(_) => {}
			Err(err) => eprintln!("rejected: {err}"),
		}
	}
}

fn echo_action(label: String) -> Action<String> {
	let echoed = label.clone();
	Action::new(label, move || {
		println!("  -> {echoed}");
		Ok(())
	})
}

fn report_click(result: Result<ActionOutcome, herald_queue::ActionFault>) {
	match result {
		Ok(ActionOutcome::Invoked) => {}
		Ok(ActionOutcome::Ignored) => println!("(nothing to click)"),
		Err(fault) => eprintln!("{fault}"),
	}
}

async fn report_events(mut events: broadcast::Receiver<QueueEvent>) {
	loop {
		match events.recv().await {
			Ok(QueueEvent::Closed { surface, reason }) => info!(%surface, ?reason, "message closed"),
			Ok(QueueEvent::AwaitingSurface { attempts }) if attempts == 1 => info!("waiting for a visible surface"),
			Ok(QueueEvent::Stopped) | Err(broadcast::error::RecvError::Closed) => break,
			Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
		}
	}
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_env("HERALD_LOG")
		.or_else(|_| EnvFilter::try_from_default_env())
		.unwrap_or_else(|_| {
			if verbose {
				EnvFilter::new("herald=debug,herald_queue=trace,info")
			} else {
				EnvFilter::new("herald=info,herald_queue=info,warn")
			}
		});

	// stdout belongs to the surface.
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(verbose)
		.init();
}
