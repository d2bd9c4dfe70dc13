use clap::Parser;
use miette::Result;
use qcpack::cli::{Cli, Commands};
use qcpack::core::logging;

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior so piping to `head` exits quietly
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    logging::init(global.verbose);

    match cli.command {
        None | Some(Commands::Menu) => qcpack::cli::commands::menu::run(&global),
        Some(Commands::Register(args)) => qcpack::cli::commands::register::run(args, &global),
        Some(Commands::List(args)) => qcpack::cli::commands::list::run(args, &global),
        Some(Commands::Remove(args)) => qcpack::cli::commands::remove::run(args, &global),
        Some(Commands::Boxes(args)) => qcpack::cli::commands::boxes::run(args, &global),
        Some(Commands::Report(args)) => qcpack::cli::commands::report::run(args, &global),
        Some(Commands::Config(cmd)) => qcpack::cli::commands::config::run(cmd, &global),
        Some(Commands::Completions(args)) => qcpack::cli::commands::completions::run(args),
    }
}
