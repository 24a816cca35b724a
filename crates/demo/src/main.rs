//! A small watch face driven by a scripted touch sequence. Draw commands are
//! printed as they arrive, and the final tree is dumped on exit.

use std::{
    cell::Cell,
    io::{self, Write},
    path::PathBuf,
    rc::Rc,
    thread,
};

use anyhow::{Result, format_err};
use bezel::{
    Align, Capability, Color, Content, DrawCommand, Engine, EngineConfig, EventSender, Font, Grid,
    ImageRef, InputEvent, Node, NodeId, Overlay, Stack, Style, Surface, Tree,
    dump::{dump, dump_plain},
    event::keys,
    geom::{Insets, Point, Size},
    widgets::{button, current_page, swiper},
};
use clap::{ArgAction, Parser};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Run a watch face against a printing surface
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Engine settings as JSON
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Override the screen width
    #[clap(long)]
    width: Option<u32>,

    /// Override the screen height
    #[clap(long)]
    height: Option<u32>,

    /// Turn off render pruning
    #[clap(long)]
    no_prune: bool,

    /// Print the effective configuration and exit
    #[clap(long)]
    print_config: bool,

    /// Color the final tree dump
    #[clap(long)]
    color: bool,

    /// Log more; repeat for trace output
    #[clap(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Args {
    /// The configuration file, if any, with command-line overrides applied.
    fn config(&self) -> Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::load(path)?,
            None => EngineConfig::default(),
        };
        if let Some(w) = self.width {
            config.screen_width = w;
        }
        if let Some(h) = self.height {
            config.screen_height = h;
        }
        if self.no_prune {
            config.prune_render = false;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Writes each command as a line of text.
struct Printer<W: Write> {
    /// Destination.
    out: W,
    /// Frames presented so far.
    frames: usize,
}

impl<W: Write> Surface for Printer<W> {
    fn draw(&mut self, cmd: &DrawCommand) -> bezel::Result<()> {
        let mut flags = String::new();
        if cmd.focused {
            flags.push_str(" focused");
        }
        if cmd.pressed {
            flags.push_str(" pressed");
        }
        writeln!(self.out, "  {cmd}{flags}")?;
        Ok(())
    }

    fn present(&mut self) -> bezel::Result<()> {
        self.frames += 1;
        writeln!(self.out, "-- frame {}", self.frames)?;
        self.out.flush()?;
        Ok(())
    }
}

/// Node handles the script needs.
struct Face {
    /// The swipe pager.
    pager: NodeId,
    /// The start button on the clock page.
    start: NodeId,
    /// Start button activations.
    clicks: Rc<Cell<u32>>,
}

/// Build the face: a status strip over a pager of three pages.
fn build(tree: &mut Tree) -> bezel::Result<Face> {
    let root = tree.root();
    let status = tree.push(
        root,
        Node::new("status")
            .policy(Stack::row().gap(2).cross(Align::Center))
            .style(Style::new().padding(Insets::symmetric(2, 4)))
            .weight(0),
    )?;
    tree.push(
        status,
        Node::new("battery")
            .content(Content::Image(ImageRef::new("battery", Size::new(16, 8))))
            .with_cap(Capability::Drawable)
            .weight(0),
    )?;
    tree.push(
        status,
        Node::new("date")
            .text("MON 12")
            .with_cap(Capability::Drawable)
            .style(Style::new().font(Font::new("small", 6, 8)))
            .weight(0),
    )?;

    let pages = vec![
        Node::new("clock").policy(Stack::column().gap(8).cross(Align::Center)),
        Node::new("steps").policy(Overlay::centered()),
        Node::new("weather").policy(Grid::new(2).gap(4)),
    ];
    let pager = swiper(tree, root, "pager", pages)?;
    let &[clock, steps, weather] = tree.children(pager)? else {
        return Err(bezel::Error::NotFound(pager));
    };

    let big = Style::new()
        .font(Font::new("large", 24, 40))
        .foreground(Color::from_u32(0xffd24a));
    tree.push(
        clock,
        Node::new("time")
            .text("10:09")
            .with_cap(Capability::Drawable)
            .style(big)
            .weight(0),
    )?;
    let (start, clicks) = button(
        tree,
        clock,
        "start",
        Style::new()
            .font(Font::new("small", 6, 8))
            .background(Color::from_u32(0x2a2a2a))
            .border(Insets::all(1), Color::WHITE),
    )?;

    tree.push(
        steps,
        Node::new("count")
            .text("8,412\nsteps")
            .with_cap(Capability::Drawable)
            .style(Style::new().font(Font::new("medium", 12, 16))),
    )?;
    for (name, icon) in [("sun", "sun"), ("wind", "wind"), ("rain", "drop"), ("uv", "uv")] {
        tree.push(
            weather,
            Node::new(name)
                .content(Content::Image(ImageRef::new(icon, Size::new(32, 32))))
                .with_cap(Capability::Drawable),
        )?;
    }
    Ok(Face {
        pager,
        start,
        clicks,
    })
}

/// Feed the engine a tap on the button, a swipe each way, keyboard
/// navigation and a resize, from another thread.
fn script(tx: EventSender, button: Point, screen: Size) -> bezel::Result<()> {
    let mid_y = i32::try_from(screen.h / 2).unwrap_or(i32::MAX);
    let right = i32::try_from(screen.w).unwrap_or(i32::MAX) - 10;
    let mut t = 0;
    let mut at = |step: u64| {
        t += step;
        t
    };
    tx.send(InputEvent::down(button.x, button.y, at(0)))?;
    tx.send(InputEvent::up(button.x, button.y, at(80)))?;

    tx.send(InputEvent::down(right, mid_y, at(500)))?;
    tx.send(InputEvent::moved(right - 40, mid_y + 2, at(30)))?;
    tx.send(InputEvent::moved(right - 120, mid_y + 4, at(30)))?;
    tx.send(InputEvent::up(right - 120, mid_y + 4, at(30)))?;

    tx.send(InputEvent::down(10, mid_y, at(500)))?;
    tx.send(InputEvent::moved(30, mid_y, at(100)))?;
    tx.send(InputEvent::up(40, mid_y, at(100)))?;

    tx.send(InputEvent::key_down(keys::TAB, at(500)))?;
    tx.send(InputEvent::key_down(keys::ENTER, at(50)))?;
    tx.send(InputEvent::resize(Size::new(screen.w, screen.h + 40), at(500)))?;
    // Dropping the last sender stops the engine.
    drop(tx);
    Ok(())
}

pub fn main() -> Result<()> {
    let args = Args::parse();
    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(io::stderr)
        .init();

    let config = args.config()?;
    if args.print_config {
        println!("{}", config.to_json()?);
        return Ok(());
    }

    let mut tree = Tree::new(
        Node::new("face")
            .policy(Stack::column().fill())
            .with_cap(Capability::Drawable)
            .style(Style::new().background(Color::BLACK)),
    );
    let face = build(&mut tree)?;
    let (mut engine, tx) = Engine::new(tree, &config)?;
    let mut surface = Printer {
        out: io::stdout().lock(),
        frames: 0,
    };

    // Lay out once so the script knows where the button landed.
    engine.pump(&mut surface)?;
    let r = engine.tree().node(face.start)?.rect();
    let target = Point::new(
        r.tl.x + i32::try_from(r.w / 2).unwrap_or(0),
        r.tl.y + i32::try_from(r.h / 2).unwrap_or(0),
    );
    let screen = engine.screen();
    info!("button at {:?}", target);
    let producer = thread::spawn(move || script(tx, target, screen));

    engine.run(&mut surface)?;
    producer
        .join()
        .map_err(|_| format_err!("input thread panicked"))??;

    let tree = engine.tree();
    let listing = if args.color {
        dump(tree)?
    } else {
        dump_plain(tree)?
    };
    println!("{listing}");
    println!(
        "page {:?}, start pressed {} times, {} frames",
        current_page(tree, face.pager),
        face.clicks.get(),
        surface.frames
    );
    Ok(())
}
