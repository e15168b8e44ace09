use crate::{
    board::Tile,
    dice::{self, TwoDiceSum},
    good_set::GoodSet,
    odds::{self, Breakdown},
    stats, DEFAULT_NUM_SAMPLES, DEFAULT_SEED,
};
use ndarray::Array1;
use rand::{distributions::Distribution, SeedableRng};
use rand_xoshiro::Xoroshiro64Star;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use tabular::{row, Table};
// `std::time::Instant` panics in wasm; this one uses `performance.now()` there.
use trice::Instant;

///////////////////////////
// String parser helpers //
///////////////////////////

fn parse_req<T>(label: &'static str, s: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    T::from_str(s).map_err(|err| format!("invalid {label}: {err}"))
}

fn parse_opt<T>(label: &'static str, opt_s: Option<&str>) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    opt_s
        .map(T::from_str)
        .transpose()
        .map_err(|err| format!("invalid {label}: {err}"))
}

/// A `u64` seed, in decimal or `0x`-prefixed hex.
fn parse_seed(s: &str) -> Result<u64, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => u64::from_str(s),
    };
    parsed.map_err(|err| format!("invalid seed: '{s}': {err}"))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|err| format!("failed to serialize output: {err}"))
}

//////////////////////
// CLI Args Wrapper //
//////////////////////

pub struct Args(pico_args::Arguments);

impl Args {
    pub fn new(inner: pico_args::Arguments) -> Self {
        Self(inner)
    }

    fn subcommand(&mut self) -> Result<Option<String>, String> {
        self.0.subcommand().map_err(|err| err.to_string())
    }

    fn opt_value(&mut self, keys: impl Into<pico_args::Keys>) -> Result<Option<String>, String> {
        self.0
            .opt_value_from_fn(keys, |s| Result::<_, pico_args::Error>::Ok(s.to_owned()))
            .map_err(|err| err.to_string())
    }

    fn free_value(&mut self) -> Result<String, String> {
        self.0
            .free_from_fn(|s| Result::<_, pico_args::Error>::Ok(s.to_owned()))
            .map_err(|err| err.to_string())
    }

    fn flag(&mut self, keys: impl Into<pico_args::Keys>) -> bool {
        self.0.contains(keys)
    }

    fn expect_finished(self) -> Result<(), String> {
        let remaining = self.0.finish();
        if !remaining.is_empty() {
            Err(format!("unexpected arguments left: '{:?}'", remaining))
        } else {
            Ok(())
        }
    }

    fn maybe_help(&mut self, usage: &str) {
        if self.0.contains(["-h", "--help"]) {
            print!("{}", usage);
            std::process::exit(0);
        }
    }
}

/////////////
// Metrics //
/////////////

#[derive(Clone, Default, PartialEq, Eq)]
pub struct Metrics(pub Vec<(String, String)>);

impl Metrics {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, label: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.0.push((label.into(), value.into()));
        self
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new("{:>}  {:<}");

        for (label, value) in &self.0 {
            table.add_row(row!(label, value));
        }

        table
    }
}

///////////////////
// Command trait //
///////////////////

pub trait Command: Sized {
    const USAGE: &'static str;

    type Output: fmt::Display;

    fn try_from_cli_args(args: Args) -> Result<Self, String>;
    fn run(self) -> Result<Self::Output, String>;
}

//////////////////
// BoardCommand //
//////////////////

#[derive(Clone, Debug)]
pub struct BoardCommand;

impl Command for BoardCommand {
    const USAGE: &'static str = "\
boardodds board - list every tile on the board with its index and group

USAGE:
    boardodds board
";

    type Output = Table;

    fn try_from_cli_args(mut args: Args) -> Result<Self, String> {
        args.maybe_help(Self::USAGE);

        args.expect_finished()?;
        Ok(Self)
    }

    fn run(self) -> Result<Self::Output, String> {
        let mut table = Table::new("{:>}  {:<}  {:<}").with_row(row!("tile", "name", "group"));

        for tile in Tile::all() {
            table.add_row(row!(tile, tile.name(), tile.group()));
        }

        Ok(table)
    }
}

///////////////////
// ChanceCommand //
///////////////////

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChanceCommand {
    good: GoodSet,
    start: Tile,
    json: bool,
}

impl ChanceCommand {
    pub fn try_from_str_args(good: Option<&str>, start: &str, json: bool) -> Result<Self, String> {
        Ok(Self {
            good: parse_opt("good set", good)?.unwrap_or_default(),
            start: parse_req("start tile", start)?,
            json,
        })
    }
}

impl Command for ChanceCommand {
    const USAGE: &'static str = "\
boardodds chance - the chance one roll from a tile lands on a good tile

USAGE:
    boardodds chance [option ...] <start>

EXAMPLES:
    boardodds chance -g [5] 0
    boardodds chance -g [railroads,chance] 39

OPTIONS:
    · --good / -g [tok,tok,..] (default: [])
      The good tiles. Each token is a tile index (0-39) or a group name
      (corners, taxes, chance, railroads, community-chest, properties).
      Tokens are toggled left to right, so `[railroads,5]` leaves 15, 25, 35.

    · --json
      Print the breakdown as JSON instead of a table.
";

    type Output = ChanceCommandOutput;

    fn try_from_cli_args(mut args: Args) -> Result<Self, String> {
        args.maybe_help(Self::USAGE);

        let json = args.flag("--json");
        let good = args.opt_value(["-g", "--good"])?;
        let start = args.free_value()?;
        args.expect_finished()?;

        Self::try_from_str_args(good.as_deref(), &start, json)
    }

    fn run(self) -> Result<Self::Output, String> {
        let start_time = Instant::now();
        let breakdown = odds::breakdown_from(self.start, &self.good);
        let duration = start_time.elapsed();

        let mut metrics = Metrics::new();
        metrics.push("duration", format!("{:.2?}", duration));
        metrics.push("good tiles", format!("{} {}", self.good.len(), self.good));

        let json = if self.json {
            Some(to_json(&breakdown)?)
        } else {
            None
        };

        Ok(ChanceCommandOutput {
            breakdown,
            metrics,
            json,
        })
    }
}

pub struct ChanceCommandOutput {
    pub breakdown: Breakdown,
    pub metrics: Metrics,
    json: Option<String>,
}

impl ChanceCommandOutput {
    fn to_table(&self) -> Table {
        let mut table = Table::new("{:>}  {:>}  {:<}  {:>}").with_row(row!(
            format!("{:>6}", "roll"),
            "tile",
            "name",
            "p"
        ));

        for row in &self.breakdown.rows {
            table.add_row(row!(
                row.roll,
                row.tile,
                row.name,
                format!("{:.2}%", row.probability_mass * 100.0)
            ));
        }

        table.add_row(row!(
            "total",
            "",
            "",
            format!("{:.2}%", self.breakdown.total_percentage)
        ));

        table
    }
}

impl fmt::Display for ChanceCommandOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.json {
            Some(json) => writeln!(f, "{}", json),
            None => write!(f, "\n{}\n{}", self.to_table(), self.metrics.to_table()),
        }
    }
}

////////////////////
// HeatmapCommand //
////////////////////

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HeatmapCommand {
    good: GoodSet,
    json: bool,
}

impl Command for HeatmapCommand {
    const USAGE: &'static str = "\
boardodds heatmap - the chance of landing on a good tile from every tile

USAGE:
    boardodds heatmap [option ...]

EXAMPLES:
    boardodds heatmap -g [railroads]

OPTIONS:
    · --good / -g [tok,tok,..] (default: [])
      The good tiles, as in `boardodds chance`.

    · --json
      Print the chances as JSON instead of a table.
";

    type Output = HeatmapCommandOutput;

    fn try_from_cli_args(mut args: Args) -> Result<Self, String> {
        args.maybe_help(Self::USAGE);

        let json = args.flag("--json");
        let good = args.opt_value(["-g", "--good"])?;
        args.expect_finished()?;

        Ok(Self {
            good: parse_opt("good set", good.as_deref())?.unwrap_or_default(),
            json,
        })
    }

    fn run(self) -> Result<Self::Output, String> {
        let start_time = Instant::now();
        let chances = odds::heatmap(&self.good);
        let best = odds::best_start(&chances);
        let duration = start_time.elapsed();

        let mut metrics = Metrics::new();
        metrics.push("duration", format!("{:.2?}", duration));
        metrics.push("good tiles", format!("{} {}", self.good.len(), self.good));
        if let Some(best) = best {
            metrics.push(
                "best start",
                format!("{} {} ({:.2}%)", best, best.name(), chances[best.index() as usize]),
            );
        }

        let mut out = HeatmapCommandOutput {
            chances: chances.to_vec(),
            best,
            metrics,
            json: None,
        };
        if self.json {
            out.json = Some(to_json(&out)?);
        }

        Ok(out)
    }
}

#[derive(Serialize)]
pub struct HeatmapCommandOutput {
    pub chances: Vec<f64>,
    pub best: Option<Tile>,
    #[serde(skip)]
    pub metrics: Metrics,
    #[serde(skip)]
    json: Option<String>,
}

impl fmt::Display for HeatmapCommandOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(json) = &self.json {
            return writeln!(f, "{}", json);
        }

        let mut table = Table::new("{:>}  {:<}  {:>}  {:<}").with_row(row!(
            format!("{:>6}", "start"),
            "name",
            "chance",
            ""
        ));

        for (tile, chance) in Tile::all().zip(self.chances.iter()) {
            let marker = if Some(tile) == self.best { "*" } else { "" };
            table.add_row(row!(tile, tile.name(), format!("{:.2}%", chance), marker));
        }

        write!(f, "\n{}\n{}", table, self.metrics.to_table())
    }
}

///////////////////
// SampleCommand //
///////////////////

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SampleCommand {
    good: GoodSet,
    start: Tile,
    num_samples: usize,
    seed: u64,
}

impl SampleCommand {
    fn try_from_str_args(
        good: Option<&str>,
        num_samples: Option<&str>,
        seed: Option<&str>,
        start: &str,
    ) -> Result<Self, String> {
        let cmd = Self {
            good: parse_opt("good set", good)?.unwrap_or_default(),
            num_samples: parse_opt("number of rolls", num_samples)?.unwrap_or(DEFAULT_NUM_SAMPLES),
            seed: seed.map(parse_seed).transpose()?.unwrap_or(DEFAULT_SEED),
            start: parse_req("start tile", start)?,
        };

        if cmd.num_samples == 0 {
            return Err("the number of rolls must be positive".to_string());
        }

        Ok(cmd)
    }
}

impl Command for SampleCommand {
    const USAGE: &'static str = "\
boardodds sample - cross-check the exact chance against simulated rolls

USAGE:
    boardodds sample [option ...] <start>

EXAMPLES:
    boardodds sample -g [5] 0
    boardodds sample -g [railroads] -n 100000 --seed 42 39

OPTIONS:
    · --good / -g [tok,tok,..] (default: [])
      The good tiles, as in `boardodds chance`.

    · --num-rolls / -n rolls (default: 10000)
      How many rolls to simulate.

    · --seed seed (default: 0xb0a2d)
      The RNG seed, in decimal or 0x-prefixed hex.
";

    type Output = SampleCommandOutput;

    fn try_from_cli_args(mut args: Args) -> Result<Self, String> {
        args.maybe_help(Self::USAGE);

        let good = args.opt_value(["-g", "--good"])?;
        let num_samples = args.opt_value(["-n", "--num-rolls"])?;
        let seed = args.opt_value("--seed")?;
        let start = args.free_value()?;
        args.expect_finished()?;

        Self::try_from_str_args(
            good.as_deref(),
            num_samples.as_deref(),
            seed.as_deref(),
            &start,
        )
    }

    fn run(self) -> Result<Self::Output, String> {
        let start_time = Instant::now();

        let mut rng = Xoroshiro64Star::seed_from_u64(self.seed);
        let mut sum_counts = Array1::<usize>::zeros(dice::sums().len());
        let mut hits = 0_usize;

        for roll in TwoDiceSum::new().sample_iter(&mut rng).take(self.num_samples) {
            sum_counts[(roll - dice::MIN_SUM) as usize] += 1;
            if self.good.is_good(self.start.advance(roll)) {
                hits += 1;
            }
        }

        let p = stats::sum_pmf();
        let p_hat = stats::counts_to_pmf(sum_counts.view());
        let pvalue = stats::multinomial_test(self.num_samples, p.view(), p_hat.view())?;

        let exact = odds::chance_from(self.start, &self.good);
        let empirical = odds::round_2dp((hits as f64) * 100.0 / (self.num_samples as f64));
        let duration = start_time.elapsed();

        let mut metrics = Metrics::new();
        metrics.push("duration", format!("{:.2?}", duration));
        metrics.push("rolls", self.num_samples.to_string());
        metrics.push("seed", format!("{:#x}", self.seed));
        metrics.push("exact chance", format!("{:.2}%", exact));
        metrics.push("sampled chance", format!("{:.2}%", empirical));
        metrics.push("|diff|", format!("{:.2}", (exact - empirical).abs()));
        metrics.push("sum distr p-value", format!("{:.4}", pvalue));

        Ok(SampleCommandOutput {
            sum_counts: sum_counts.to_vec(),
            num_samples: self.num_samples,
            exact,
            empirical,
            pvalue,
            metrics,
        })
    }
}

pub struct SampleCommandOutput {
    pub sum_counts: Vec<usize>,
    pub num_samples: usize,
    pub exact: f64,
    pub empirical: f64,
    pub pvalue: f64,
    pub metrics: Metrics,
}

impl fmt::Display for SampleCommandOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut table = Table::new("{:>}  {:>}  {:>}").with_row(row!(
            format!("{:>6}", "sum"),
            "p",
            "p_hat"
        ));

        for (sum, &count) in dice::sums().zip(self.sum_counts.iter()) {
            table.add_row(row!(
                sum,
                format!("{:.4}", dice::mass_of(sum)),
                format!("{:.4}", (count as f64) / (self.num_samples as f64))
            ));
        }

        write!(f, "\n{}\n{}", table, self.metrics.to_table())
    }
}

/////////////////
// BaseCommand //
/////////////////

#[derive(Debug)]
pub enum BaseCommand {
    Board(BoardCommand),
    Chance(ChanceCommand),
    Heatmap(HeatmapCommand),
    Sample(SampleCommand),
}

impl Command for BaseCommand {
    const USAGE: &'static str = "\
boardodds - how likely is one roll of two dice to land you on a tile you like?

USAGE:
    boardodds [option ...] <subcommand>

OPTIONS:
    · -v / -vv
      Log more to stderr.

SUBCOMMANDS:
    · boardodds board - list every tile with its index and group
    · boardodds chance - breakdown of the chance to hit a good tile from one start
    · boardodds heatmap - the chance to hit a good tile from every start
    · boardodds sample - cross-check the exact chance against simulated rolls
";

    type Output = String;

    fn try_from_cli_args(mut args: Args) -> Result<Self, String> {
        let maybe_subcommand = args.subcommand()?;

        match maybe_subcommand.as_deref() {
            Some("board") => Ok(Self::Board(BoardCommand::try_from_cli_args(args)?)),
            Some("chance") => Ok(Self::Chance(ChanceCommand::try_from_cli_args(args)?)),
            Some("heatmap") => Ok(Self::Heatmap(HeatmapCommand::try_from_cli_args(args)?)),
            Some("sample") => Ok(Self::Sample(SampleCommand::try_from_cli_args(args)?)),
            Some(command) => Err(format!("'{}' is not a recognized command", command)),
            None => {
                args.maybe_help(Self::USAGE);
                Err("no subcommand specified".to_string())
            }
        }
    }

    fn run(self) -> Result<String, String> {
        match self {
            Self::Board(cmd) => cmd.run().map(|out| out.to_string()),
            Self::Chance(cmd) => cmd.run().map(|out| out.to_string()),
            Self::Heatmap(cmd) => cmd.run().map(|out| out.to_string()),
            Self::Sample(cmd) => cmd.run().map(|out| out.to_string()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::board::NUM_TILES;
    use claim::assert_err;
    use std::ffi::OsString;

    fn args(argv: &[&str]) -> Args {
        Args::new(pico_args::Arguments::from_vec(
            argv.iter().map(OsString::from).collect(),
        ))
    }

    #[test]
    fn test_parse_base_command() {
        assert!(matches!(
            BaseCommand::try_from_cli_args(args(&["board"])),
            Ok(BaseCommand::Board(_))
        ));
        assert!(matches!(
            BaseCommand::try_from_cli_args(args(&["chance", "-g", "[5]", "0"])),
            Ok(BaseCommand::Chance(_))
        ));
        assert!(matches!(
            BaseCommand::try_from_cli_args(args(&["heatmap", "--json"])),
            Ok(BaseCommand::Heatmap(_))
        ));
        assert!(matches!(
            BaseCommand::try_from_cli_args(args(&["sample", "-n", "100", "3"])),
            Ok(BaseCommand::Sample(_))
        ));
        assert_err!(BaseCommand::try_from_cli_args(args(&["jail"])));
        assert_err!(BaseCommand::try_from_cli_args(args(&["chance", "40"])));
        assert_err!(BaseCommand::try_from_cli_args(args(&["chance", "0", "1"])));
        assert_err!(BaseCommand::try_from_cli_args(args(&["chance", "-g", "[jail]", "0"])));
        assert_err!(BaseCommand::try_from_cli_args(args(&["sample", "-n", "0", "0"])));
    }

    #[test]
    fn test_parse_seed() {
        assert_eq!(Ok(42), parse_seed("42"));
        assert_eq!(Ok(DEFAULT_SEED), parse_seed("0xb0a2d"));
        assert_eq!(Ok(DEFAULT_SEED), parse_seed("0XB0A2D"));
        assert_err!(parse_seed("0x"));
        assert_err!(parse_seed("0xzz"));
        assert_err!(parse_seed("-1"));

        let cmd = SampleCommand::try_from_str_args(None, Some("10"), Some("0xb0a2d"), "0").unwrap();
        assert_eq!(DEFAULT_SEED, cmd.seed);
        assert_err!(SampleCommand::try_from_str_args(None, None, Some("seed"), "0"));
    }

    #[test]
    fn test_board_command() {
        let out = BoardCommand.run().unwrap().to_string();
        assert_eq!(NUM_TILES as usize + 1, out.lines().count());
        assert!(out.contains("Boardwalk"));
        assert!(out.contains("railroads"));
    }

    #[test]
    fn test_chance_command() {
        let cmd = ChanceCommand::try_from_str_args(Some("[5]"), "0", false).unwrap();
        let out = cmd.run().unwrap();

        assert_eq!(11.11, out.breakdown.total_percentage);
        assert_eq!(1, out.breakdown.rows.len());

        let text = out.to_string();
        assert!(text.contains("Reading Railroad"));
        assert!(text.contains("11.11%"));
    }

    #[test]
    fn test_chance_command_json() {
        let cmd = ChanceCommand::try_from_str_args(Some("[1]"), "39", true).unwrap();
        let text = cmd.run().unwrap().to_string();

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(2.78, value["total_percentage"].as_f64().unwrap());
        assert_eq!(2, value["rows"][0]["roll"].as_u64().unwrap());
        assert_eq!(1, value["rows"][0]["tile"].as_u64().unwrap());
        assert_eq!(39, value["start"].as_u64().unwrap());
    }

    #[test]
    fn test_heatmap_command() {
        let cmd = HeatmapCommand {
            good: GoodSet::from_str("[5]").unwrap(),
            json: false,
        };
        let out = cmd.run().unwrap();
        assert_eq!(NUM_TILES as usize, out.chances.len());
        assert_eq!(Some(Tile::new(38)), out.best);
        assert_eq!(16.67, out.chances[38]);
        assert!(out.to_string().contains("16.67%"));
    }

    #[test]
    fn test_heatmap_command_json() {
        let cmd = HeatmapCommand {
            good: GoodSet::all(),
            json: true,
        };
        let text = cmd.run().unwrap().to_string();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(NUM_TILES as usize, value["chances"].as_array().unwrap().len());
        assert_eq!(100.0, value["chances"][17].as_f64().unwrap());
        assert_eq!(0, value["best"].as_u64().unwrap());
    }

    #[test]
    fn test_sample_command() {
        let cmd = SampleCommand::try_from_str_args(Some("[railroads]"), Some("20000"), None, "0")
            .unwrap();
        let out = cmd.run().unwrap();

        assert_eq!(20_000, out.sum_counts.iter().sum::<usize>());
        // roll 5 from GO is the only railroad in reach
        assert_eq!(11.11, out.exact);
        assert!((out.exact - out.empirical).abs() < 1.5);
        assert!(out.pvalue > 0.001);
    }
}
