//! REPL – interactive shell over the two services.
//!
//! Supported slash-commands:
//!   /help                               – show this list
//!   /objects [json]                     – query the fixed kitchen objects
//!   /poke <x> <y> <z> <frame> [dir]     – compute a poke position
//!   /checkpoints                        – show the latest pipeline checkpoints
//!   /frames                             – list the known reference frames
//!   /quit | /exit                       – leave the shell

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use colored::{ColoredString, Colorize};
use knowledge_reasoning::FixedObjectQueryService;
use knowledge_runtime::PokePositionService;
use knowledge_types::{
    CheckpointKind, Direction, KnowledgeError, Point3, PokePositionRequest, StampedPoint,
};

/// Everything the shell operates on.
pub struct Session {
    pub objects: FixedObjectQueryService,
    pub poke: PokePositionService,
    pub frames: Vec<String>,
}

/// A parsed shell line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Objects { json: bool },
    Poke(PokePositionRequest),
    Checkpoints,
    Frames,
    Quit,
}

/// Parse one non-empty input line.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Err("empty command".to_string());
    };
    let args: Vec<&str> = words.collect();

    match (head, args.as_slice()) {
        ("/help", []) => Ok(Command::Help),
        ("/objects", []) => Ok(Command::Objects { json: false }),
        ("/objects", ["json"]) => Ok(Command::Objects { json: true }),
        ("/poke", args) => parse_poke(args).map(Command::Poke),
        ("/checkpoints", []) => Ok(Command::Checkpoints),
        ("/frames", []) => Ok(Command::Frames),
        ("/quit" | "/exit", []) => Ok(Command::Quit),
        ("/help" | "/objects" | "/checkpoints" | "/frames" | "/quit" | "/exit", _) => {
            Err(format!("unexpected arguments to {head}"))
        }
        (other, _) => Err(format!("unknown command '{other}'")),
    }
}

fn parse_poke(args: &[&str]) -> Result<PokePositionRequest, String> {
    let (coords, frame, direction) = match args {
        [x, y, z, frame] => ([*x, *y, *z], *frame, Direction::Unspecified),
        [x, y, z, frame, dir] => ([*x, *y, *z], *frame, Direction::from(*dir)),
        _ => return Err("usage: /poke <x> <y> <z> <frame> [left|right]".to_string()),
    };

    let mut values = [0.0; 3];
    for (value, text) in values.iter_mut().zip(coords) {
        *value = text
            .parse::<f64>()
            .map_err(|_| format!("'{text}' is not a number"))?;
    }
    let [x, y, z] = values;

    Ok(PokePositionRequest {
        detection_point: StampedPoint::new(frame, Utc::now(), Point3::new(x, y, z)),
        direction,
    })
}

/// Run the shell until `/quit`, EOF, or `shutdown` is set.
pub fn run(session: &Session, shutdown: Arc<AtomicBool>) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }

        print!("{} ", "knowledge>".bold().purple());
        stdout.flush().ok();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => {
                eprintln!("{}: {}", "Read error".red(), e);
                break;
            }
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match parse_command(line) {
            Ok(Command::Help) => cmd_help(),
            Ok(Command::Objects { json }) => cmd_objects(session, json),
            Ok(Command::Poke(request)) => cmd_poke(session, &request),
            Ok(Command::Checkpoints) => cmd_checkpoints(session),
            Ok(Command::Frames) => cmd_frames(session),
            Ok(Command::Quit) => {
                println!("{}", "Goodbye.".green());
                shutdown.store(true, Ordering::SeqCst);
                break;
            }
            Err(e) => {
                println!(
                    "{} {}. Type {} for available commands.",
                    "Error:".red(),
                    e.yellow(),
                    "/help".bold()
                );
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Command handlers
// ─────────────────────────────────────────────────────────────────────────────

fn cmd_help() {
    println!();
    println!("{}", "Knowledge Commands".bold().underline());
    println!("  {}          – list fixed kitchen objects (add `json` for raw output)", "/objects".bold().cyan());
    println!("  {} – poke position for a detection, LEFT if no direction", "/poke x y z frame [dir]".bold().cyan());
    println!("  {}      – latest vision / transform / knowledge points", "/checkpoints".bold().cyan());
    println!("  {}           – known reference frames", "/frames".bold().cyan());
    println!("  {}     – exit the shell", "/quit  /exit".bold().cyan());
    println!();
}

fn cmd_objects(session: &Session, json: bool) {
    let response = match session.objects.get_fixed_kitchen_objects() {
        Ok(response) => response,
        Err(KnowledgeError::NoResults { predicate }) => {
            println!("{} {}", "No fixed objects:".yellow(), predicate.dimmed());
            return;
        }
        Err(e) => {
            println!("{}: {}", "Query failed".red(), e);
            return;
        }
    };

    if json {
        match serde_json::to_string_pretty(&response) {
            Ok(text) => println!("{text}"),
            Err(e) => println!("{}: {}", "Serialization failed".red(), e),
        }
        return;
    }

    println!(
        "{} ({} in {})",
        "Fixed Kitchen Objects".bold().underline(),
        response.len(),
        response.frame_id.yellow()
    );
    for ((name, pose), size) in response
        .names
        .iter()
        .zip(&response.poses)
        .zip(&response.bounding_boxes)
    {
        let p = pose.position;
        let q = pose.orientation;
        println!("  {}", name.bold());
        println!("    position    ({:.3}, {:.3}, {:.3})", p.x, p.y, p.z);
        println!("    orientation ({:.3}, {:.3}, {:.3}, {:.3})", q.x, q.y, q.z, q.w);
        println!("    size        {:.3} × {:.3} × {:.3}", size.x, size.y, size.z);
    }
}

fn cmd_poke(session: &Session, request: &PokePositionRequest) {
    let response = session.poke.calculate_poke_position(request);
    if response.is_success() {
        let p = response.poke_position.point;
        println!(
            "{} ({:.3}, {:.3}, {:.3}) in {}",
            "✓ Poke at".green(),
            p.x,
            p.y,
            p.z,
            response.poke_position.header.frame_id.bold()
        );
    } else {
        println!("{} {}", "✗".red().bold(), response.error_message.red());
    }
}

fn cmd_checkpoints(session: &Session) {
    let snapshot = session.poke.board().snapshot();
    println!("{}", "Checkpoints".bold().underline());
    for kind in CheckpointKind::ALL {
        let label = format!("{:<10}", kind.namespace());
        match snapshot.get(kind) {
            Some(sp) => println!(
                "  {} ({:.3}, {:.3}, {:.3}) in {} at {}",
                marker(kind, &label),
                sp.point.x,
                sp.point.y,
                sp.point.z,
                sp.header.frame_id.bold(),
                sp.header.stamp.format("%H:%M:%S%.3f")
            ),
            None => println!("  {} {}", marker(kind, &label), "(unset)".dimmed()),
        }
    }
}

fn cmd_frames(session: &Session) {
    let target = session.poke.target_frame();
    println!("{}", "Frames".bold().underline());
    if session.frames.is_empty() {
        println!("  {}", "(no frames configured)".dimmed());
    }
    for frame in &session.frames {
        if frame == target {
            println!("  {} {}", frame.bold(), "(poke target)".green());
        } else {
            println!("  {frame}");
        }
    }
}

/// `label` in the colour the visualiser uses for `kind`.
fn marker(kind: CheckpointKind, label: &str) -> ColoredString {
    match kind {
        CheckpointKind::Vision => label.blue(),
        CheckpointKind::Transformed => label.white(),
        CheckpointKind::Knowledge => label.purple(),
    }
}
