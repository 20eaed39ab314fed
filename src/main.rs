use clap::{Parser, Subcommand};
use colored::Colorize;
use uidesigner::commands;
use uidesigner::commands::behavior::{EventArgs, MethodArgs};
use uidesigner::commands::object::AddArgs;

#[derive(Parser)]
#[command(name = "uidesigner")]
#[command(about = "Design UI component trees and generate their client code", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the designer config file
    #[arg(long, global = true, default_value = "designer.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty designer project
    Init {
        /// Project id
        id: String,
    },
    /// Add an object to a project
    Add {
        id: String,
        /// Object name, a JavaScript identifier
        name: String,
        /// Component class, e.g. Panel or Grid
        class: Option<String>,
        /// Parent object (defaults to the layout root)
        #[arg(long)]
        parent: Option<String>,
        /// Property as key=value, repeatable
        #[arg(long = "prop")]
        props: Vec<String>,
        /// Create an instance of this extended component instead
        #[arg(long)]
        instance_of: Option<String>,
    },
    /// Remove an object, its children, instances and references to it
    Remove {
        id: String,
        name: String,
    },
    /// Move an object under a new parent
    Move {
        id: String,
        name: String,
        parent: String,
        /// New sibling order as a comma separated list of names
        #[arg(long)]
        order: Option<String>,
    },
    /// Rename an object and everything that refers to it
    Rename {
        id: String,
        name: String,
        new_name: String,
    },
    /// Generate an edit window with a form and save/cancel buttons
    WindowForm {
        id: String,
        /// Base name for the generated objects
        #[arg(default_value = "editWindow")]
        base: String,
    },
    /// Set, rename or remove an event handler
    Event {
        id: String,
        object: String,
        event: String,
        #[arg(long)]
        code: Option<String>,
        /// Declare a custom event
        #[arg(long)]
        local: bool,
        /// Buffer delay in milliseconds
        #[arg(long)]
        buffer: Option<u32>,
        /// Handler parameters, e.g. "int id, e"
        #[arg(long)]
        params: Option<String>,
        /// New name for a local event
        #[arg(long)]
        rename: Option<String>,
        #[arg(long)]
        remove: bool,
    },
    /// Add, update, rename or remove a method
    Method {
        id: String,
        object: String,
        name: String,
        #[arg(long)]
        params: Option<String>,
        #[arg(long)]
        code: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        rename: Option<String>,
        #[arg(long)]
        remove: bool,
    },
    /// Print the object tree
    Tree {
        id: String,
    },
    /// Generate client code for a project or a single object
    Code {
        id: String,
        #[arg(long)]
        object: Option<String>,
        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<String>,
    },
    /// List stored projects
    List,
}

fn main() {
    uidesigner::init_logging();
    let cli = Cli::parse();
    let config = cli.config.as_str();

    let result = match cli.command {
        Commands::Init { id } => commands::init::execute(config, &id),
        Commands::Add { id, name, class, parent, props, instance_of } => commands::object::add(
            config,
            &id,
            AddArgs {
                name: &name,
                class: class.as_deref(),
                parent: parent.as_deref(),
                properties: &props,
                instance_of: instance_of.as_deref(),
            },
        ),
        Commands::Remove { id, name } => commands::object::remove(config, &id, &name),
        Commands::Move { id, name, parent, order } => {
            commands::object::move_object(config, &id, &name, &parent, order.as_deref())
        }
        Commands::Rename { id, name, new_name } => commands::object::rename(config, &id, &name, &new_name),
        Commands::WindowForm { id, base } => commands::object::window_form(config, &id, &base),
        Commands::Event { id, object, event, code, local, buffer, params, rename, remove } => {
            commands::behavior::event(
                config,
                &id,
                &object,
                &event,
                EventArgs {
                    code: code.as_deref(),
                    local,
                    buffer,
                    params: params.as_deref(),
                    rename: rename.as_deref(),
                    remove,
                },
            )
        }
        Commands::Method { id, object, name, params, code, description, rename, remove } => {
            commands::behavior::method(
                config,
                &id,
                &object,
                &name,
                MethodArgs {
                    params: params.as_deref(),
                    code: code.as_deref(),
                    description: description.as_deref(),
                    rename: rename.as_deref(),
                    remove,
                },
            )
        }
        Commands::Tree { id } => commands::tree::execute(config, &id),
        Commands::Code { id, object, out } => {
            commands::code::execute(config, &id, object.as_deref(), out.as_deref())
        }
        Commands::List => commands::list::execute(config),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
