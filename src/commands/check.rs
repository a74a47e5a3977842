use crate::alerts::{AlertDispatcher, AlertTrigger};
use crate::cli::VitalArgs;
use crate::commands::context::AppContext;
use crate::models::Role;
use crate::output::OutputFormat;
use anyhow::Context;

pub async fn handle_check_command(patient_id: String, vitals: VitalArgs, ctx: &AppContext, json_output: bool) -> anyhow::Result<()> {
    let patient = ctx.repository.find_with_role(&patient_id, Role::Patient);
    let vital = vitals.to_vital_sign().context("Invalid vital-sign reading")?;

    let dispatcher = AlertDispatcher::new(ctx.channel.clone(), ctx.pool);
    let outcome = dispatcher
        .dispatch(AlertTrigger::ThresholdBreach { patient, vital: Some(&vital) }, &ctx.repository)
        .await
        .with_context(|| format!("Cannot check vitals for patient {}", patient_id))?;

    if json_output {
        println!("{}", outcome.to_json()?);
    } else {
        println!("{}", vital);
        println!("{}", outcome.to_table());
    }
    Ok(())
}
