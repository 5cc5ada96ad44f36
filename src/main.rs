mod app;
mod doc;
mod util;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    #[arg(long)]
    graph: Option<String>,

    #[arg(long)]
    plan: Option<String>,

    #[arg(long)]
    summaries: Option<String>,
}

fn main() -> eframe::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "clusterlens",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::ClusterLensApp::new(
                cc,
                args.graph.clone(),
                args.plan.clone(),
                args.summaries.clone(),
            )))
        }),
    )
}
