// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, command, value_parser};

fn json_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print as JSON lines"),
    )
}

fn split_args(cmd: Command) -> Command {
    cmd.arg(Arg::new("amount").long("amount").required(true))
        .arg(
            Arg::new("payer")
                .long("payer")
                .required(true)
                .help("Member who paid"),
        )
        .arg(
            Arg::new("split")
                .long("split")
                .default_value("equal")
                .help("equal|percentage|amount"),
        )
        .arg(
            Arg::new("with")
                .long("with")
                .help("Comma-separated participants for an equal split (defaults to the group)"),
        )
        .arg(
            Arg::new("share")
                .long("share")
                .action(ArgAction::Append)
                .help("NAME=VALUE, a percentage or an amount; repeat per participant"),
        )
        .arg(Arg::new("group").long("group").help("Group name"))
}

pub fn build_cli() -> Command {
    command!()
        .name("splitclip")
        .about("Shared expenses, settlements, and who-owes-whom balances")
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .help("Path to the SQLite database (defaults to the platform data dir)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Debug logging (overridden by SPLITCLIP_LOG)"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("member")
                .about("Manage members")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("email").long("email")),
                )
                .subcommand(json_args(Command::new("list")))
                .subcommand(Command::new("rm").arg(Arg::new("name").long("name").required(true))),
        )
        .subcommand(
            Command::new("group")
                .about("Manage groups")
                .subcommand(
                    Command::new("create")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(
                            Arg::new("admin")
                                .long("admin")
                                .required(true)
                                .help("Creator; always added as a member"),
                        )
                        .arg(
                            Arg::new("members")
                                .long("members")
                                .help("Comma-separated member names"),
                        )
                        .arg(Arg::new("description").long("description")),
                )
                .subcommand(json_args(Command::new("list")))
                .subcommand(json_args(
                    Command::new("show").arg(Arg::new("name").long("name").required(true)),
                )),
        )
        .subcommand(
            Command::new("expense")
                .about("Shared expenses")
                .subcommand(split_args(
                    Command::new("preview").about("Compute splits without saving"),
                ))
                .subcommand(
                    split_args(Command::new("add"))
                        .arg(
                            Arg::new("description")
                                .long("description")
                                .required(true),
                        )
                        .arg(Arg::new("date").long("date").help("YYYY-MM-DD, defaults to today"))
                        .arg(
                            Arg::new("allow_mismatch")
                                .long("allow-mismatch")
                                .action(ArgAction::SetTrue)
                                .help("Save even if the splits do not add up to the amount"),
                        ),
                )
                .subcommand(json_args(
                    Command::new("list")
                        .arg(Arg::new("group").long("group"))
                        .arg(Arg::new("member").long("member"))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                ))
                .subcommand(Command::new("rm").arg(Arg::new("id").long("id").required(true))),
        )
        .subcommand(
            Command::new("settle")
                .about("Direct payments between members")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("from").long("from").required(true))
                        .arg(Arg::new("to").long("to").required(true))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("group").long("group"))
                        .arg(Arg::new("date").long("date"))
                        .arg(Arg::new("note").long("note")),
                )
                .subcommand(json_args(
                    Command::new("list")
                        .arg(Arg::new("group").long("group"))
                        .arg(Arg::new("member").long("member")),
                ))
                .subcommand(Command::new("rm").arg(Arg::new("id").long("id").required(true))),
        )
        .subcommand(
            Command::new("balance")
                .about("Who owes whom")
                .subcommand(json_args(
                    Command::new("group")
                        .arg(Arg::new("group").long("group").required(true))
                        .arg(
                            Arg::new("member")
                                .long("member")
                                .help("Show owes-to / owes-from for one member"),
                        ),
                ))
                .subcommand(json_args(
                    Command::new("pair")
                        .arg(Arg::new("member").long("member").required(true))
                        .arg(Arg::new("with").long("with").required(true))
                        .arg(
                            Arg::new("history")
                                .long("history")
                                .action(ArgAction::SetTrue)
                                .help("Also list the expenses and settlements between the two"),
                        ),
                )),
        )
        .subcommand(
            Command::new("export")
                .about("Export balances")
                .subcommand(
                    Command::new("balances")
                        .arg(Arg::new("group").long("group").required(true))
                        .arg(Arg::new("format").long("format").default_value("csv"))
                        .arg(Arg::new("out").long("out").required(true)),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Settings: split_mode, split_tolerance, currency")
                .subcommand(Command::new("show"))
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("key").long("key").required(true))
                        .arg(Arg::new("value").long("value").required(true)),
                ),
        )
        .subcommand(Command::new("doctor").about("Check stored data for inconsistencies"))
}
