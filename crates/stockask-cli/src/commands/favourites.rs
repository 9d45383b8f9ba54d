use serde_json::json;
use stockask_core::FavouriteStore;

use crate::cli::{FavouritesArgs, FavouritesCommand};
use crate::error::CliError;

use super::{ask, CommandResult, Context};

pub async fn run(args: &FavouritesArgs, context: &Context) -> Result<CommandResult, CliError> {
    let mut store = FavouriteStore::in_home(&context.home)?;

    match &args.command {
        FavouritesCommand::List => Ok(CommandResult::ok(listing(&store))),
        FavouritesCommand::Add { text } => {
            let index = store.add(&text.join(" "))?;
            store.save()?;
            Ok(CommandResult::ok(json!({
                "added": index,
                "favourites": listing(&store)["favourites"],
            })))
        }
        FavouritesCommand::Remove { index } => {
            let removed = store.remove(*index)?;
            store.save()?;
            Ok(CommandResult::ok(json!({
                "removed": serde_json::to_value(removed)?,
                "favourites": listing(&store)["favourites"],
            })))
        }
        FavouritesCommand::Run { index, chart } => {
            let question = store.get(*index)?.text.clone();
            let service = ask::build_service(context)?;
            ask::ask(service, &question, chart, context.show_progress).await
        }
    }
}

fn listing(store: &FavouriteStore) -> serde_json::Value {
    let favourites: Vec<_> = store
        .list()
        .iter()
        .enumerate()
        .map(|(index, favourite)| {
            json!({
                "index": index,
                "text": favourite.text,
                "saved_at": favourite.saved_at,
            })
        })
        .collect();
    json!({ "favourites": favourites })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn context(home: &Path) -> Context {
        Context {
            home: home.to_path_buf(),
            show_progress: false,
        }
    }

    #[tokio::test]
    async fn add_list_remove_round_trip() {
        let temp = tempfile::tempdir().expect("tempdir");
        let context = context(temp.path());

        let added = run(
            &FavouritesArgs {
                command: FavouritesCommand::Add {
                    text: vec![String::from("max of AAPL in 2015")],
                },
            },
            &context,
        )
        .await
        .expect("add");
        assert_eq!(added.data["added"], 0);

        let listed = run(&FavouritesArgs { command: FavouritesCommand::List }, &context)
            .await
            .expect("list");
        assert_eq!(listed.data["favourites"][0]["text"], "max of AAPL in 2015");

        let removed = run(
            &FavouritesArgs {
                command: FavouritesCommand::Remove { index: 0 },
            },
            &context,
        )
        .await
        .expect("remove");
        assert_eq!(removed.data["removed"]["text"], "max of AAPL in 2015");
        assert_eq!(removed.data["favourites"].as_array().map(Vec::len), Some(0));
    }

    #[tokio::test]
    async fn removing_missing_index_is_usage_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = run(
            &FavouritesArgs {
                command: FavouritesCommand::Remove { index: 5 },
            },
            &context(temp.path()),
        )
        .await
        .expect_err("out of range");
        assert_eq!(err.exit_code(), 2);
    }
}
