use clap::Parser;
use fpmosaic::io::{load_rgba_image, save_rgba_image};
use fpmosaic::{
    composite_images, mosaic_from_pairs, BlendOptions, CaptureArchive, MatchedPair, MergeMatched,
    MergeOptions, MinutiaPoint, MinutiaType, MosaicResult, PairingEdge, PairingGraph, Template,
    Transform,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Fingerprint mosaic CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output.
    #[arg(long)]
    trace: bool,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum MergeMatchedConfig {
    #[default]
    Probe,
    Candidate,
    Average,
}

impl From<MergeMatchedConfig> for MergeMatched {
    fn from(value: MergeMatchedConfig) -> Self {
        match value {
            MergeMatchedConfig::Probe => MergeMatched::Probe,
            MergeMatchedConfig::Candidate => MergeMatched::Candidate,
            MergeMatchedConfig::Average => MergeMatched::Average,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
struct MergeConfigJson {
    merge_matched: MergeMatchedConfig,
    include_unmatched: bool,
}

impl Default for MergeConfigJson {
    fn default() -> Self {
        Self {
            merge_matched: MergeMatchedConfig::Probe,
            include_unmatched: MergeOptions::default().include_unmatched,
        }
    }
}

impl From<MergeConfigJson> for MergeOptions {
    fn from(value: MergeConfigJson) -> Self {
        MergeOptions {
            merge_matched: value.merge_matched.into(),
            include_unmatched: value.include_unmatched,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct BlendConfigJson {
    probe_image_path: String,
    candidate_image_path: String,
    output_image_path: String,
    alpha: f64,
    background_threshold: Option<u8>,
    parallel: bool,
    /// Previously estimated transform; overrides the one from the templates.
    transform: Option<TransformRecord>,
}

impl Default for BlendConfigJson {
    fn default() -> Self {
        let cfg = BlendOptions::default();
        Self {
            probe_image_path: String::new(),
            candidate_image_path: String::new(),
            output_image_path: String::new(),
            alpha: cfg.alpha,
            background_threshold: cfg.background_threshold,
            parallel: cfg.parallel,
            transform: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    probe_template_path: String,
    candidate_template_path: String,
    pairing_path: String,
    output_path: Option<String>,
    merge: MergeConfigJson,
    blend: Option<BlendConfigJson>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
enum MinutiaTypeRecord {
    #[default]
    Ending,
    Bifurcation,
}

#[derive(Debug, Deserialize, Serialize)]
struct MinutiaRecord {
    x: f64,
    y: f64,
    direction: f64,
    #[serde(rename = "type", default)]
    kind: MinutiaTypeRecord,
}

impl From<&MinutiaPoint> for MinutiaRecord {
    fn from(value: &MinutiaPoint) -> Self {
        Self {
            x: value.x,
            y: value.y,
            direction: value.direction,
            kind: match value.kind {
                MinutiaType::Ending => MinutiaTypeRecord::Ending,
                MinutiaType::Bifurcation => MinutiaTypeRecord::Bifurcation,
            },
        }
    }
}

impl From<&MinutiaRecord> for MinutiaPoint {
    fn from(value: &MinutiaRecord) -> Self {
        let kind = match value.kind {
            MinutiaTypeRecord::Ending => MinutiaType::Ending,
            MinutiaTypeRecord::Bifurcation => MinutiaType::Bifurcation,
        };
        MinutiaPoint::new(value.x, value.y, value.direction, kind)
    }
}

#[derive(Debug, Deserialize, Serialize)]
struct TemplateRecord {
    width: usize,
    height: usize,
    minutiae: Vec<MinutiaRecord>,
}

impl From<&Template> for TemplateRecord {
    fn from(value: &Template) -> Self {
        Self {
            width: value.width(),
            height: value.height(),
            minutiae: value.minutiae().iter().map(MinutiaRecord::from).collect(),
        }
    }
}

impl TemplateRecord {
    fn into_template(self) -> fpmosaic::Result<Template> {
        let minutiae = self.minutiae.iter().map(MinutiaPoint::from).collect();
        Template::new(self.width, self.height, minutiae)
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
struct PairRecord {
    probe: usize,
    candidate: usize,
}

impl From<PairRecord> for MatchedPair {
    fn from(value: PairRecord) -> Self {
        MatchedPair::new(value.probe, value.candidate)
    }
}

impl From<MatchedPair> for PairRecord {
    fn from(value: MatchedPair) -> Self {
        Self {
            probe: value.probe,
            candidate: value.candidate,
        }
    }
}

#[derive(Debug, Deserialize)]
struct EdgeRecord {
    from: PairRecord,
    to: PairRecord,
}

#[derive(Debug, Deserialize)]
struct GraphRecord {
    root: PairRecord,
    #[serde(default)]
    edges: Vec<EdgeRecord>,
}

impl From<GraphRecord> for PairingGraph {
    fn from(value: GraphRecord) -> Self {
        PairingGraph {
            root: value.root.into(),
            edges: value
                .edges
                .into_iter()
                .map(|edge| PairingEdge::new(edge.from.into(), edge.to.into()))
                .collect(),
        }
    }
}

/// Pairing file: the matcher's recorded pairing data and score.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PairingFile {
    score: f64,
    best_pairing: Option<GraphRecord>,
    pairing: Option<GraphRecord>,
    roots: Option<Vec<PairRecord>>,
}

impl From<PairingFile> for CaptureArchive {
    fn from(value: PairingFile) -> Self {
        CaptureArchive {
            best_pairing: value.best_pairing.map(PairingGraph::from),
            pairing: value.pairing.map(PairingGraph::from),
            roots: value
                .roots
                .map(|roots| roots.into_iter().map(MatchedPair::from).collect()),
            ..CaptureArchive::default()
        }
    }
}

/// Full transform record. On input `cos` and `sin` are optional and always
/// recomputed from `rotation`.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
struct TransformRecord {
    rotation: f64,
    #[serde(default)]
    cos: f64,
    #[serde(default)]
    sin: f64,
    tx: f64,
    ty: f64,
}

impl From<Transform> for TransformRecord {
    fn from(value: Transform) -> Self {
        Self {
            rotation: value.rotation,
            cos: value.cos,
            sin: value.sin,
            tx: value.tx,
            ty: value.ty,
        }
    }
}

impl From<TransformRecord> for Transform {
    fn from(value: TransformRecord) -> Self {
        Transform::new(value.rotation, value.tx, value.ty)
    }
}

#[derive(Debug, Serialize)]
struct Output {
    template: TemplateRecord,
    transform: TransformRecord,
    pairs: Vec<PairRecord>,
    score: f64,
}

impl From<&MosaicResult> for Output {
    fn from(value: &MosaicResult) -> Self {
        Self {
            template: TemplateRecord::from(&value.template),
            transform: value.transform.into(),
            pairs: value.pairs.iter().copied().map(PairRecord::from).collect(),
            score: value.score,
        }
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)
        .map_err(|err| format!("failed to read {}: {err}", path.display()))?;
    Ok(serde_json::from_str(&text)?)
}

fn run_mosaic(config: &Config) -> Result<MosaicResult, Box<dyn std::error::Error>> {
    let probe = read_json::<TemplateRecord>(Path::new(&config.probe_template_path))?
        .into_template()?;
    let candidate = read_json::<TemplateRecord>(Path::new(&config.candidate_template_path))?
        .into_template()?;
    let pairing: PairingFile = read_json(Path::new(&config.pairing_path))?;
    let score = pairing.score;
    let pairs = CaptureArchive::from(pairing).pairs()?;

    let options = MergeOptions::from(config.merge);
    let result = mosaic_from_pairs(&probe, &candidate, pairs, score, &options)?;
    tracing::info!(
        pairs = result.pairs.len(),
        minutiae = result.template.len(),
        rotation = result.transform.rotation,
        "templates merged"
    );
    Ok(result)
}

fn run_blend(
    blend: &BlendConfigJson,
    estimated: Option<Transform>,
) -> Result<(), Box<dyn std::error::Error>> {
    if blend.probe_image_path.is_empty()
        || blend.candidate_image_path.is_empty()
        || blend.output_image_path.is_empty()
    {
        return Err(
            "blend needs probe_image_path, candidate_image_path and output_image_path".into(),
        );
    }
    let transform = blend
        .transform
        .map(Transform::from)
        .or(estimated)
        .ok_or("blend needs a transform: set blend.transform or configure templates")?;

    let probe = load_rgba_image(&blend.probe_image_path)?;
    let candidate = load_rgba_image(&blend.candidate_image_path)?;
    let options = BlendOptions {
        alpha: blend.alpha,
        background_threshold: blend.background_threshold,
        parallel: blend.parallel,
    };
    let output = composite_images(probe.view(), candidate.view(), &transform, &options)?;
    save_rgba_image(&output, &blend.output_image_path)?;
    tracing::info!(path = %blend.output_image_path, "blended image written");
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("fpmosaic=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;

    let has_templates = !config.probe_template_path.is_empty()
        || !config.candidate_template_path.is_empty()
        || !config.pairing_path.is_empty();
    if !has_templates && config.blend.is_none() {
        return Err("config must set template paths, a blend section, or both".into());
    }

    let result = if has_templates {
        if config.probe_template_path.is_empty()
            || config.candidate_template_path.is_empty()
            || config.pairing_path.is_empty()
        {
            return Err(
                "probe_template_path, candidate_template_path and pairing_path must all be set"
                    .into(),
            );
        }
        Some(run_mosaic(&config)?)
    } else {
        None
    };

    if let Some(blend) = &config.blend {
        run_blend(blend, result.as_ref().map(|r| r.transform))?;
    }

    if let Some(result) = &result {
        let json = serde_json::to_string_pretty(&Output::from(result))?;
        match &config.output_path {
            Some(path) => fs::write(path, json)?,
            None => println!("{json}"),
        }
    }

    Ok(())
}
