//! Drive the demo site headlessly and print what each step renders.
//!
//! Run with `RUST_LOG=dim=debug cargo run --example site` to see the
//! router and element lifecycle logs.

use dim::testing::{tag_lines, Pilot, PilotError};
use tracing_subscriber::EnvFilter;

fn show(pilot: &Pilot, step: &str) {
    println!("── {step} ──");
    println!("location: {}", pilot.location());
    println!("title:    {}", pilot.title());
    println!("{}\n", tag_lines(&pilot.composed_html()));
}

fn main() -> Result<(), PilotError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let pilot = Pilot::site()?;
    pilot.start();
    show(&pilot, "start");

    pilot.click("a[href=\"/layout-alt\"]");
    show(&pilot, "click: Layout Alt");

    pilot.set_language("de");
    show(&pilot, "language: de");

    pilot.navigate("/does-not-exist");
    show(&pilot, "navigate: /does-not-exist");

    pilot.back();
    show(&pilot, "back");

    Ok(())
}
