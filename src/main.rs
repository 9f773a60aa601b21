use clap::{CommandFactory, FromArgMatches};
use dotenv::dotenv;
use log::*;
use std::{collections::HashMap, process};

use topstat::{poll, server_status, utility, Opts};

#[tokio::main]
async fn main() {
    env_logger::init();
    dotenv().ok();
    let fields_help = format!(
        "Stat line columns to show, by key (comma separated).\n\
        A key that is not listed below selects a serverStatus field by its dotted path, \
        suffixed with .diff() for the difference or .rate() for the difference per second.\n\n{}",
        server_status::describe_fields(),
    );
    let matches = Opts::command()
        .mut_arg("fields", |arg| arg.long_help(fields_help))
        .get_matches();
    let options = Opts::from_arg_matches(&matches).unwrap_or_else(|error| error.exit());

    let mut changed_options = HashMap::new();
    let hosts = utility::set_hosts(&options.hosts, &mut changed_options);
    let ports = utility::set_ports(&options.ports, &mut changed_options);
    debug!("hosts: {:?}, ports: {:?}", hosts, ports);

    if let Err(error) = utility::dotenv_writer(options.write_dotenv, changed_options) {
        error!("{:#}", error);
        process::exit(1);
    }

    // a failing host is reported when it stops
    if poll::poll_hosts(hosts, ports, &options).await.is_err() {
        process::exit(1);
    }
}
