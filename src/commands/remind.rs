use crate::commands::context::AppContext;
use crate::output::OutputFormat;
use crate::reminders::ReminderScheduler;

pub async fn handle_remind_command(ctx: &AppContext, json_output: bool) -> anyhow::Result<()> {
    let prescriptions = ctx.repository.prescriptions();
    let scheduler = ReminderScheduler::new(ctx.channel.clone(), ctx.pool).with_policy(ctx.config.failure_policy());

    let batch = scheduler.run(ctx.repository.appointments(), &prescriptions).await;

    if json_output {
        println!("{}", batch.to_json()?);
    } else {
        println!("{}", batch.to_table());
    }
    Ok(())
}
