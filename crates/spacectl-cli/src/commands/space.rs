use std::path::Path;

use anyhow::{Context, Result};
use spacectl_core::{SpaceController, Transport, UpdateError};

use crate::cli::OutputFormat;
use crate::output::{print_plan, print_state, print_success};
use crate::state;

/// Creates the space when nothing is tracked, otherwise converges it.
/// A failed update still records the state reached before the failure.
pub async fn apply<T: Transport>(
    controller: &SpaceController<T>,
    file: &Path,
    state_path: &Path,
    format: OutputFormat,
) -> Result<()> {
    let desired = state::load_desired(file)?;

    let Some(observed) = state::load_state(state_path)? else {
        let created = controller.create(&desired).await?;
        state::save_state(state_path, &created)?;
        print_success(&format!("Created space {}", created.id));
        return print_state(&created, format);
    };

    match controller.update(&desired, &observed).await {
        Ok(updated) => {
            state::save_state(state_path, &updated)?;
            print_success(&format!("Space {} is up to date", updated.id));
            print_state(&updated, format)
        }
        Err(UpdateError { state: partial, error }) => {
            state::save_state(state_path, &partial)?;
            Err(anyhow::Error::new(error).context(format!(
                "Update of {} stopped; partial state saved to {}",
                partial.id,
                state_path.display()
            )))
        }
    }
}

pub fn plan(file: &Path, state_path: &Path) -> Result<()> {
    let desired = state::load_desired(file)?;
    match state::load_state(state_path)? {
        Some(observed) => print_plan(&spacectl_core::plan(&desired, &observed)),
        None => println!("Space {} will be created", desired.name),
    }
    Ok(())
}

/// A space deleted out of band stops being tracked.
pub async fn refresh<T: Transport>(
    controller: &SpaceController<T>,
    state_path: &Path,
    format: OutputFormat,
) -> Result<()> {
    let observed = state::require_state(state_path)?;
    match controller.refresh(&observed).await {
        Ok(current) => {
            state::save_state(state_path, &current)?;
            print_state(&current, format)
        }
        Err(e) if e.is_not_found() => {
            state::remove_state(state_path)?;
            print_success(&format!(
                "Space {} no longer exists; stopped tracking it",
                observed.id
            ));
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

pub fn show(state_path: &Path, format: OutputFormat) -> Result<()> {
    let observed = state::require_state(state_path)?;
    print_state(&observed, format)
}

pub async fn destroy<T: Transport>(
    controller: &SpaceController<T>,
    state_path: &Path,
) -> Result<()> {
    let observed = state::require_state(state_path)?;
    controller.delete(&observed).await?;
    state::remove_state(state_path)?;
    print_success(&format!("Deleted space {}", observed.id));
    Ok(())
}

pub async fn import<T: Transport>(
    controller: &SpaceController<T>,
    id: &str,
    state_path: &Path,
    format: OutputFormat,
) -> Result<()> {
    if let Some(tracked) = state::load_state(state_path)? {
        anyhow::bail!(
            "{} already tracks space {}",
            state_path.display(),
            tracked.id
        );
    }
    let imported = controller.import(id)?;
    let current = controller
        .refresh(&imported)
        .await
        .with_context(|| format!("Failed to read imported space {id}"))?;
    state::save_state(state_path, &current)?;
    print_success(&format!("Imported space {}", current.id));
    print_state(&current, format)
}
