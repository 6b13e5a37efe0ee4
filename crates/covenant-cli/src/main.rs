use std::env;
use std::net::SocketAddr;

use covenant_api::serve;
use covenant_core::console::OperatorConsole;
use covenant_core::criteria::FactView;
use covenant_core::identity::demo_directory;

fn print_usage() {
    println!("covenant-cli <command>");
    println!("commands:");
    println!("  create <preset_id> <owner>");
    println!("  list");
    println!("  complete <arg_index> [prefix]");
    println!("    arg 0: contract presets, arg 1: connected identities");
    println!("  demo");
    println!("    seeds contracts and runs scripted criteria sweeps");
    println!("  serve [addr]");
    println!("    default addr: 127.0.0.1:8080");
}

fn parse_arg_index(value: Option<&String>) -> Result<usize, String> {
    let raw = value.ok_or_else(|| "missing arg_index".to_string())?;
    raw.parse::<usize>()
        .map_err(|_| format!("invalid arg_index: {raw}"))
}

fn parse_socket_addr(value: Option<&String>) -> Result<SocketAddr, String> {
    let raw = value.map(String::as_str).unwrap_or("127.0.0.1:8080");
    raw.parse::<SocketAddr>()
        .map_err(|_| format!("invalid addr: {raw}"))
}

fn run_demo(console: &mut OperatorConsole) -> Result<(), String> {
    let escort = console
        .create("contract-escort", "darya")
        .map_err(|err| err.to_string())?;
    let delivery = console
        .create("contract-delivery", "kess")
        .map_err(|err| err.to_string())?;
    let withdrawn = console
        .create("contract-basic", "kess")
        .map_err(|err| err.to_string())?;

    {
        let manager = console.manager_mut();
        let _ = manager.activate(escort).map_err(|err| err.to_string())?;
        let _ = manager.add_sub_contractor(escort, "actor:kess");
        let _ = manager.activate(delivery).map_err(|err| err.to_string())?;
        let _ = manager.cancel(withdrawn).map_err(|err| err.to_string())?;
    }

    // Scripted fact timeline: the charge arrives on the second pass, the
    // delivery window runs out on the third.
    let mut passes = Vec::new();
    let mut quiet = FactView::new();
    quiet.set("charge_health", 90);
    quiet.set("delivery_ticks_remaining", 12);
    passes.push(("nothing resolves", quiet.clone()));

    let mut arrival = quiet.clone();
    arrival.set("charge_at_destination", 1);
    passes.push(("escort charge arrives", arrival.clone()));

    let mut expiry = arrival;
    expiry.set("delivery_ticks_remaining", 0);
    passes.push(("delivery window expires", expiry));

    for (label, facts) in passes {
        let outcome = console.sweep(&facts);
        println!(
            "sweep ({label}): breached={} finalized={}",
            outcome.breached, outcome.finalized
        );
    }

    println!("{}", console.render_list());
    for change in console.manager().changes() {
        println!("change {} {} -> {}", change.handle, change.previous, change.new);
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(String::as_str);

    let mut console = OperatorConsole::with_defaults(demo_directory());

    match command {
        Some("create") => match (args.get(2), args.get(3)) {
            (Some(preset_id), Some(owner)) => {
                let line = format!("create {preset_id} {owner}");
                match console.execute(&line) {
                    Ok(reply) => println!("{reply}"),
                    Err(err) => {
                        eprintln!("error: {err}");
                        std::process::exit(2);
                    }
                }
            }
            _ => {
                eprintln!("error: usage: create <preset_id> <owner>");
                print_usage();
                std::process::exit(2);
            }
        },
        Some("list") => {
            println!("{}", console.render_list());
        }
        Some("complete") => match parse_arg_index(args.get(2)) {
            Ok(arg_index) => {
                let prefix = args.get(3).map(String::as_str).unwrap_or("");
                for candidate in console.complete(arg_index, prefix) {
                    println!("{candidate}");
                }
            }
            Err(err) => {
                eprintln!("error: {err}");
                print_usage();
                std::process::exit(2);
            }
        },
        Some("demo") => {
            if let Err(err) = run_demo(&mut console) {
                eprintln!("error: {err}");
                std::process::exit(2);
            }
        }
        Some("serve") => match parse_socket_addr(args.get(2)) {
            Ok(addr) => {
                println!("serving admin api on http://{addr}");
                if let Err(err) = serve(addr).await {
                    eprintln!("server error: {err}");
                    std::process::exit(1);
                }
            }
            Err(err) => {
                eprintln!("error: {err}");
                print_usage();
                std::process::exit(2);
            }
        },
        _ => {
            print_usage();
        }
    }
}
