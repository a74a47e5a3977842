use crate::alerts::{AlertDispatcher, AlertTrigger};
use crate::commands::context::AppContext;
use crate::models::Role;
use crate::output::OutputFormat;
use anyhow::Context;

pub async fn handle_panic_command(patient_id: String, doctor_id: Option<String>, ctx: &AppContext, json_output: bool) -> anyhow::Result<()> {
    let patient = ctx.repository.find_with_role(&patient_id, Role::Patient);
    let dispatcher = AlertDispatcher::new(ctx.channel.clone(), ctx.pool);

    let outcome = match doctor_id {
        Some(doctor_id) => {
            let doctor = ctx.repository.find_with_role(&doctor_id, Role::Doctor);
            dispatcher
                .dispatch(AlertTrigger::ManualPanic { patient, doctor }, &ctx.repository)
                .await
        }
        None => dispatcher.panic_all(patient, &ctx.repository).await,
    }
    .with_context(|| format!("Cannot raise panic alert for patient {}", patient_id))?;

    if json_output {
        println!("{}", outcome.to_json()?);
    } else {
        println!("{}", outcome.to_table());
    }
    Ok(())
}
