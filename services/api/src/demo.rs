use clap::Args;
use partner_plan::config::AppConfig;
use partner_plan::error::AppError;
use partner_plan::optimizer::{OptimizeError, StructureOptimizer};
use partner_plan::plan::{
    OptimizationRequest, OptimizationResult, PlayerProfile, QualificationRank, Region,
};
use partner_plan::scenarios::{self, ScenarioReport};

#[derive(Args, Debug)]
pub(crate) struct OptimizeArgs {
    /// Monthly income goal in plan units
    #[arg(long)]
    pub(crate) target_income: f64,
    /// Player's own monthly sales volume
    #[arg(long, default_value_t = 200.0)]
    pub(crate) personal_volume: f64,
    /// Current qualification code, e.g. M1 or B3
    #[arg(long, default_value = "M1", value_parser = parse_rank)]
    pub(crate) qualification: QualificationRank,
    /// Sales region code (RU, KZ, UZ, KG)
    #[arg(long, default_value = "RU", value_parser = parse_region)]
    pub(crate) region: Region,
    /// Force a target qualification instead of deriving one
    #[arg(long, value_parser = parse_rank)]
    pub(crate) target_qualification: Option<QualificationRank>,
    /// Force a frontline size instead of the sizing policy
    #[arg(long)]
    pub(crate) partners: Option<usize>,
    /// Print the raw result as JSON instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Income goal used for the demo run
    #[arg(long, default_value_t = 5_000.0)]
    pub(crate) target_income: f64,
}

fn parse_rank(raw: &str) -> Result<QualificationRank, String> {
    QualificationRank::from_code(raw)
        .ok_or_else(|| format!("unknown qualification code '{raw}'"))
}

fn parse_region(raw: &str) -> Result<Region, String> {
    Region::from_code(raw).ok_or_else(|| format!("unknown region code '{raw}'"))
}

pub(crate) fn run_optimize(args: OptimizeArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let optimizer = StructureOptimizer::new(config.plan).map_err(OptimizeError::from)?;

    let request = OptimizationRequest {
        profile: PlayerProfile {
            personal_volume: args.personal_volume,
            qualification: args.qualification,
            target_income: args.target_income,
            region: args.region,
        },
        target_qualification: args.target_qualification,
        partner_count: args.partners,
    };
    let result = optimizer.optimize(&request)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result).expect("result serializes"));
    } else {
        print_result(&result);
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let optimizer = StructureOptimizer::new(config.plan).map_err(OptimizeError::from)?;

    let profile = PlayerProfile {
        personal_volume: 200.0,
        qualification: QualificationRank::M1,
        target_income: args.target_income,
        region: Region::Ru,
    };

    println!("=== Structure optimization demo ===");
    println!(
        "Income goal: {:.0} plan units, personal volume {:.0}, current rank {}",
        profile.target_income, profile.personal_volume, profile.qualification
    );
    println!();

    let request = OptimizationRequest::for_profile(profile.clone());
    let result = optimizer.optimize(&request)?;
    print_result(&result);

    println!();
    println!("=== Allocation strategies, best first ===");
    let reports = scenarios::generate(&optimizer, &profile, result.target_qualification)?;
    print_scenarios(&reports);

    Ok(())
}

fn print_result(result: &OptimizationResult) {
    println!(
        "Target rank {} -> projected rank {} ({} partners, {:.0} group volume)",
        result.target_qualification,
        result.projected_qualification,
        result.partners.len(),
        result.required_volume
    );

    let income = &result.expected_income;
    println!("  personal bonus  {:>12.2}", income.personal_bonus);
    println!("  partner bonus   {:>12.2}", income.partner_bonus);
    println!("  group bonus     {:>12.2}", income.group_bonus);
    println!("  club bonus      {:>12.2}", income.club_bonus);
    println!("  total           {:>12.2} ({:.2} {})", income.total, result.total_in_currency, result.currency);

    let metrics = &result.metrics;
    println!(
        "  balance {:.3} | risk {:.3} | growth {:.3} | predictor {:?}",
        metrics.structure_balance, metrics.risk_score, metrics.growth_potential, result.predictor
    );

    let key_count = result
        .partners
        .iter()
        .take_while(|partner| partner.volume >= result.partners[0].volume - 1e-9)
        .count();
    println!(
        "  frontline: {} key / {} ordinary partners",
        key_count,
        result.partners.len() - key_count
    );
}

fn print_scenarios(reports: &[ScenarioReport]) {
    println!(
        "{:<14} {:>8} {:>14} {:>12} {:>8} {:>8}",
        "strategy", "partners", "volume", "income", "risk", "score"
    );
    for report in reports {
        println!(
            "{:<14} {:>8} {:>14.0} {:>12.2} {:>8.3} {:>8.3}",
            report.strategy.label(),
            report.partner_count,
            report.required_volume,
            report.expected_income.total,
            report.metrics.risk_score,
            report.score
        );
    }
}
