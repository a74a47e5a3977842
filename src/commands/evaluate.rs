use crate::alerts::evaluate;
use crate::cli::VitalArgs;
use crate::output::OutputFormat;
use anyhow::Context;

pub fn handle_evaluate_command(vitals: VitalArgs, json_output: bool) -> anyhow::Result<()> {
    let vital = vitals.to_vital_sign().context("Invalid vital-sign reading")?;
    let verdict = evaluate(Some(&vital));

    if json_output {
        println!("{}", verdict.to_json()?);
    } else {
        println!("{}", vital);
        println!("{}", verdict.to_table());
    }
    Ok(())
}
