// Copyright (c) 2025 Assocompta contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as a JSON array"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print as JSON lines"),
    )
}

pub fn build_cli() -> Command {
    Command::new("assocompta")
        .about("Comptabilité associative: saisie, exercices et archives classeur")
        .version(clap::crate_version!())
        .subcommand_required(false)
        .subcommand(Command::new("init").about("Initialise the database"))
        .subcommand(
            Command::new("tx")
                .about("Manage transactions")
                .subcommand(
                    Command::new("add")
                        .about("Record a transaction")
                        .arg(Arg::new("date").long("date").required(true).help("YYYY-MM-DD"))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("description").long("description").required(true))
                        .arg(Arg::new("category").long("category").required(true).help("Category code, e.g. 70"))
                        .arg(Arg::new("subcategory").long("subcategory").help("Subcategory code, e.g. 70-1"))
                        .arg(Arg::new("kind").long("kind").required(true).value_parser(["recette", "depense"]))
                        .arg(Arg::new("payment").long("payment").help("CB, Especes, Cheque, Virement or Prelevement (default CB)"))
                        .arg(Arg::new("event").long("event").help("Event name within the transaction's exercice"))
                        .arg(Arg::new("attachment").long("attachment").help("Path or reference of the justificatif")),
                )
                .subcommand(
                    Command::new("edit")
                        .about("Edit a transaction")
                        .arg(Arg::new("id").required(true))
                        .arg(Arg::new("date").long("date").help("YYYY-MM-DD"))
                        .arg(Arg::new("amount").long("amount"))
                        .arg(Arg::new("description").long("description"))
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("subcategory").long("subcategory"))
                        .arg(Arg::new("payment").long("payment"))
                        .arg(Arg::new("event").long("event"))
                        .arg(
                            Arg::new("no-event")
                                .long("no-event")
                                .action(ArgAction::SetTrue)
                                .help("Detach the transaction from its event"),
                        ),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .about("List transactions")
                        .arg(Arg::new("exercice").long("exercice").help("Fiscal year, e.g. 2025")),
                ))
                .subcommand(
                    Command::new("validate")
                        .about("Mark a transaction as validated")
                        .arg(Arg::new("id").required(true)),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Delete a transaction")
                        .arg(Arg::new("id").required(true)),
                ),
        )
        .subcommand(
            Command::new("event")
                .about("Manage events")
                .subcommand(
                    Command::new("add")
                        .about("Create an event")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("date").long("date").required(true).help("YYYY-MM-DD"))
                        .arg(Arg::new("kind").long("kind").value_parser([
                            "concert", "theatre", "projection", "atelier", "jeux",
                        ]))
                        .arg(Arg::new("budget").long("budget"))
                        .arg(Arg::new("capacity").long("capacity").value_parser(clap::value_parser!(i64)))
                        .arg(Arg::new("exercice").long("exercice").help("Fiscal year (default: year of the date)"))
                        .arg(Arg::new("description").long("description")),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .about("List events")
                        .arg(Arg::new("exercice").long("exercice")),
                ))
                .subcommand(
                    Command::new("rm")
                        .about("Delete an event (refused while transactions reference it)")
                        .arg(Arg::new("id").required(true)),
                ),
        )
        .subcommand(
            Command::new("category")
                .about("Manage the accounting plan")
                .subcommand(
                    Command::new("add")
                        .about("Add a category")
                        .arg(Arg::new("code").long("code").required(true))
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("kind").long("kind").required(true).value_parser(["recette", "depense"])),
                )
                .subcommand(
                    Command::new("add-sub")
                        .about("Add a subcategory to an existing category")
                        .arg(Arg::new("parent").long("parent").required(true).help("Parent category code"))
                        .arg(Arg::new("code").long("code").required(true))
                        .arg(Arg::new("name").long("name").required(true)),
                )
                .subcommand(json_flags(Command::new("list").about("List categories")))
                .subcommand(
                    Command::new("rm")
                        .about("Delete a category (refused while transactions use it)")
                        .arg(Arg::new("code").required(true)),
                )
                .subcommand(
                    Command::new("seed")
                        .about("Install the default association accounting plan"),
                ),
        )
        .subcommand(
            Command::new("exercice")
                .about("Manage fiscal years")
                .subcommand(
                    Command::new("add")
                        .about("Open a fiscal year")
                        .arg(Arg::new("year").required(true).help("Calendar year, e.g. 2025"))
                        .arg(Arg::new("opening-balance").long("opening-balance")),
                )
                .subcommand(json_flags(Command::new("list").about("List fiscal years with live totals")))
                .subcommand(
                    Command::new("activate")
                        .about("Make a fiscal year the active one")
                        .arg(Arg::new("year").required(true)),
                )
                .subcommand(
                    Command::new("close")
                        .about("Close a fiscal year and freeze its totals")
                        .arg(Arg::new("year").required(true)),
                )
                .subcommand(
                    Command::new("reopen")
                        .about("Reopen a closed fiscal year")
                        .arg(Arg::new("year").required(true))
                        .arg(Arg::new("yes").long("yes").action(ArgAction::SetTrue).help("Skip the confirmation prompt")),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Delete a fiscal year (refused while it holds transactions)")
                        .arg(Arg::new("year").required(true)),
                ),
        )
        .subcommand(
            Command::new("member")
                .about("Manage members")
                .subcommand(
                    Command::new("add")
                        .about("Register a member")
                        .arg(Arg::new("first-name").long("first-name").required(true))
                        .arg(Arg::new("last-name").long("last-name").required(true))
                        .arg(Arg::new("email").long("email").required(true))
                        .arg(Arg::new("phone").long("phone"))
                        .arg(Arg::new("date").long("date").help("Membership date, YYYY-MM-DD (default today)"))
                        .arg(Arg::new("fee").long("fee"))
                        .arg(Arg::new("address").long("address")),
                )
                .subcommand(json_flags(Command::new("list").about("List members")))
                .subcommand(
                    Command::new("rm")
                        .about("Delete a member")
                        .arg(Arg::new("id").required(true)),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Export an exercice to a workbook directory")
                .arg(Arg::new("out").long("out").required(true).help("Destination directory"))
                .arg(Arg::new("exercice").long("exercice").help("Fiscal year (default: the active exercice)")),
        )
        .subcommand(
            Command::new("import")
                .about("Import a workbook directory")
                .arg(Arg::new("path").long("path").required(true).help("Workbook directory"))
                .arg(
                    Arg::new("replace")
                        .long("replace")
                        .action(ArgAction::SetTrue)
                        .help("Clear existing records first instead of merging"),
                )
                .arg(
                    Arg::new("yes")
                        .long("yes")
                        .action(ArgAction::SetTrue)
                        .help("Skip the confirmation prompt"),
                ),
        )
}
