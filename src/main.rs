use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use placard::composer::Composer;
use placard::config;
use placard::layer::LayerId;
use placard::render::font::GlyphFace;

struct Args {
    base: PathBuf,
    font: PathBuf,
    name: String,
    id: String,
    output: PathBuf,
    portrait: Option<PathBuf>,
}

const USAGE: &str =
    "usage: placard <base-image> <font.ttf> <name> <id> <output.png> [portrait-image]";

fn required(args: &mut impl Iterator<Item = String>, what: &str) -> Result<String> {
    args.next()
        .with_context(|| format!("missing <{what}>\n{USAGE}"))
}

fn parse_args() -> Result<Args> {
    let mut args = std::env::args().skip(1);
    let parsed = Args {
        base: PathBuf::from(required(&mut args, "base-image")?),
        font: PathBuf::from(required(&mut args, "font.ttf")?),
        name: required(&mut args, "name")?,
        id: required(&mut args, "id")?,
        output: PathBuf::from(required(&mut args, "output.png")?),
        portrait: args.next().map(PathBuf::from),
    };
    if let Some(extra) = args.next() {
        bail!("unexpected argument {extra:?}\n{USAGE}");
    }
    Ok(parsed)
}

fn main() -> Result<()> {
    placard::logging::init();
    let args = parse_args()?;

    let font_bytes = std::fs::read(&args.font)
        .with_context(|| format!("reading font {}", args.font.display()))?;
    let font = GlyphFace::from_bytes(font_bytes)
        .map_err(|err| anyhow::anyhow!("loading font {}: {err}", args.font.display()))?;

    let mut composer = Composer::with_config(font, config::load_composition_config());

    let base = image::open(&args.base)
        .with_context(|| format!("reading base image {}", args.base.display()))?
        .to_rgba8();
    composer.load_base_image(base);
    composer.set_text(LayerId::Name, args.name);
    composer.set_text(LayerId::Id, args.id);

    if let Some(path) = &args.portrait {
        let portrait = image::open(path)
            .with_context(|| format!("reading portrait image {}", path.display()))?
            .to_rgba8();
        composer.set_portrait_image(Some(portrait));
    }

    let png = composer.export_png().context("exporting composite")?;
    std::fs::write(&args.output, png)
        .with_context(|| format!("writing {}", args.output.display()))?;
    tracing::info!(output = %args.output.display(), "composite written");
    Ok(())
}
