use clap::Parser;

use globus_helper::cli::{Cli, Commands};
use globus_helper::commands::{self, HandleSyncArgs, HandleTransferArgs};
use globus_helper::config::Env;
use globus_helper::sync::SyncOverrides;
use globus_helper::util::print_error;
use globus_helper::{SyncError, TransferError};

fn main() {
    let cli = Cli::parse();
    let env = Env::from_process();

    let _guard = match globus_helper::logging::init_logging(&env, cli.verbose) {
        Ok(g) => g,
        Err(e) => {
            print_error(&format!("{:#}", e));
            std::process::exit(2);
        }
    };

    if let Err(e) = run(cli.command, &env) {
        tracing::debug!("command failed: {:?}", e);
        print_error(&format!("{:#}", e));
        std::process::exit(exit_code(&e));
    }
}

fn run(command: Commands, env: &Env) -> anyhow::Result<()> {
    match command {
        Commands::Transfer {
            base_path,
            dry_run,
            apply,
            handle_zip,
            no_handle_zip,
            fail_on_collision,
            json,
        } => {
            let args = HandleTransferArgs {
                base_path,
                dry_run: Commands::transfer_dry_run(dry_run, apply),
                handle_zip: Commands::flag_pair(handle_zip, no_handle_zip),
                fail_on_collision,
                json,
            };
            commands::handle_transfer(env, args)?;
            Ok(())
        }
        Commands::Sync {
            source_endpoint,
            dest_endpoint,
            source_path,
            dest_path,
            label,
            sync_level,
            notify,
            dry_run,
            globus_command,
            extra_flags,
            preserve_mtime,
            no_preserve_mtime,
            show_command,
        } => {
            let overrides = SyncOverrides {
                source_endpoint,
                destination_endpoint: dest_endpoint,
                source_path,
                destination_path: dest_path,
                label,
                sync_level,
                notify,
                // the flag only forces a dry run; absence defers to GLOBUS_DRY_RUN
                dry_run: dry_run.then_some(true),
                extra_flags: (!extra_flags.is_empty()).then_some(extra_flags),
                preserve_mtime: Commands::flag_pair(preserve_mtime, no_preserve_mtime),
                globus_command,
            };
            commands::handle_sync(env, HandleSyncArgs { overrides, show_command })
        }
    }
}

fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(e) = err.downcast_ref::<TransferError>() {
        e.exit_code()
    } else if let Some(e) = err.downcast_ref::<SyncError>() {
        e.exit_code()
    } else {
        1
    }
}
