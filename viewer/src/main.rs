use clap::Parser;

mod bootstrap;
mod filesystem;
mod socket;
mod store;
mod viewer;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Full path to the viewer TOML config
    #[clap(short, long, value_parser, default_value = "viewer.toml")]
    config: String,
}

fn main() {
    let args = Args::parse();
    viewer::start(&args.config);
}
