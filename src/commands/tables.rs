use anyhow::anyhow;

use crate::cli::TablesCommand;
use crate::commands::Context;
use crate::views::navbar::Route;
use crate::views::tables::TablesView;

pub async fn run(ctx: &mut Context, action: Option<TablesCommand>) -> anyhow::Result<()> {
    ctx.require_login()?;
    let mut view = TablesView::new(ctx.api.clone());

    match action.unwrap_or(TablesCommand::List) {
        TablesCommand::List => {
            let result = view.load(&mut ctx.prompt).await;
            println!("{}", ctx.navbar(Route::Tables));
            print!("{}", view.render());
            result.map_err(|e| anyhow!(e))
        }

        TablesCommand::Add { table_number } => {
            let table = view
                .create(&table_number, &mut ctx.prompt)
                .await
                .map_err(|e| anyhow!(e))?;
            println!("id: {}", table.id);
            Ok(())
        }

        TablesCommand::Delete { id } => {
            view.load(&mut ctx.prompt).await.map_err(|e| anyhow!(e))?;
            view.delete(&id, &mut ctx.prompt)
                .await
                .map(|_| ())
                .map_err(|e| anyhow!(e))
        }

        TablesCommand::Qr { id, download } => {
            view.load(&mut ctx.prompt).await.map_err(|e| anyhow!(e))?;
            view.open_qr(&id).map_err(|e| anyhow!(e))?;
            print!("{}", view.render());
            if let Some(dir) = download {
                let path = view
                    .download_qr(&id, &dir, &mut ctx.prompt)
                    .await
                    .map_err(|e| anyhow!(e))?;
                println!("saved to {}", path.display());
            }
            view.close_qr();
            Ok(())
        }
    }
}
