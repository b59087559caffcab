// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, command};

fn opt(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .num_args(1)
        .help(help)
}

fn req(name: &'static str, help: &'static str) -> Arg {
    opt(name, help).required(true)
}

fn id_arg() -> Arg {
    req("id", "Record id")
}

fn output_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn list_cmd() -> Command {
    output_args(Command::new("list").about("List records"))
}

fn rm_cmd() -> Command {
    Command::new("rm").about("Delete a record").arg(id_arg())
}

fn product_fields(cmd: Command, add: bool) -> Command {
    let f = if add { req } else { opt };
    cmd.arg(f("name", "Product name"))
        .arg(f("unit", "kg|pack"))
        .arg(opt("sale-price", "Sale price per unit"))
        .arg(f("quantity", "Quantity bought"))
        .arg(opt("date", "Buying date YYYY-MM-DD (default today)"))
}

fn catalog_fields(cmd: Command, add: bool, units: &'static str) -> Command {
    let f = if add { req } else { opt };
    cmd.arg(f("name", "Name")).arg(f("unit", units))
}

fn sale_fields(cmd: Command, add: bool) -> Command {
    let f = if add { req } else { opt };
    cmd.arg(f("product", "Product id"))
        .arg(f("before", "Weight before sale"))
        .arg(f("after", "Weight after sale"))
        .arg(opt(
            "price",
            "Price per kg (defaults to the product's sale price)",
        ))
        .arg(opt("expected", "Expected cash (defaults to weight x price)"))
        .arg(opt("received", "Cash received"))
        .arg(opt("topup", "Top-up"))
        .arg(opt("charity", "Charity"))
        .arg(opt("credit", "Credit"))
        .arg(opt("date", "Sale date YYYY-MM-DD (default today)"))
}

fn expense_fields(cmd: Command, add: bool) -> Command {
    let f = if add { req } else { opt };
    cmd.arg(f("name", "Expense name"))
        .arg(f("unit", "kg|pack|piece|liter|dozen|gram|bottle|packet"))
        .arg(f("price", "Unit price"))
        .arg(f("quantity", "Quantity"))
        .arg(opt("weight", "Weight in kg"))
        .arg(opt("date", "Expense date YYYY-MM-DD (default today)"))
        .arg(opt("notes", "Notes"))
}

fn misc_fields(cmd: Command, add: bool) -> Command {
    let f = if add { req } else { opt };
    cmd.arg(f("name", "Expense name"))
        .arg(f("price", "Unit price"))
        .arg(f("quantity", "Quantity"))
        .arg(opt("date", "Expense date YYYY-MM-DD (default today)"))
        .arg(opt("notes", "Notes"))
}

fn consume_fields(cmd: Command, add: bool) -> Command {
    let f = if add { req } else { opt };
    cmd.arg(f("item", "Item name"))
        .arg(opt(
            "unit",
            "kg|pack|piece|liter|dozen|gram|bottle|packet (copied from the source when omitted)",
        ))
        .arg(f("quantity", "Quantity consumed"))
        .arg(opt("weight", "Weight in kg"))
        .arg(opt("price", "Unit price (copied from the source when omitted)"))
        .arg(opt("date", "Consumption date YYYY-MM-DD (default today)"))
        .arg(opt("notes", "Notes"))
        .arg(opt("source-type", "general_expense|custom_item (default custom_item)"))
        .arg(opt("source-id", "Id of the source expense or custom item"))
}

fn bank_fields(cmd: Command, add: bool) -> Command {
    let f = if add { req } else { opt };
    cmd.arg(f("type", "cash_received|cash_withdrawn"))
        .arg(f("amount", "Amount"))
        .arg(opt("date", "Transaction date YYYY-MM-DD (default today)"))
        .arg(opt("description", "Description"))
        .arg(opt("notes", "Notes"))
        .arg(opt("reference", "Reference"))
}

fn member_fields(cmd: Command, add: bool) -> Command {
    let f = if add { req } else { opt };
    cmd.arg(f("name", "Member name"))
        .arg(opt("relationship", "Relationship"))
        .arg(opt("monthly-amount", "Monthly support amount"))
        .arg(opt("payment-day", "Day of month the payment is due"))
        .arg(opt("active", "true|false (default true)"))
        .arg(opt("notes", "Notes"))
}

fn payment_fields(cmd: Command, add: bool) -> Command {
    let f = if add { req } else { opt };
    cmd.arg(f("member", "Family member name"))
        .arg(f("amount", "Amount"))
        .arg(opt("date", "Payment date YYYY-MM-DD (default today)"))
        .arg(opt(
            "type",
            "monthly_support|emergency|special_occasion|education|medical|other",
        ))
        .arg(opt("description", "Description"))
        .arg(opt("notes", "Notes"))
        .arg(opt("recurring", "true|false"))
        .arg(opt("next-due", "Next payment due YYYY-MM-DD"))
}

fn crud(
    name: &'static str,
    about: &'static str,
    fields: impl Fn(Command, bool) -> Command,
) -> Command {
    Command::new(name)
        .about(about)
        .subcommand(fields(Command::new("add").about("Add a record"), true))
        .subcommand(list_cmd())
        .subcommand(fields(
            Command::new("edit").about("Change a record").arg(id_arg()),
            false,
        ))
        .subcommand(rm_cmd())
}

pub fn build_cli() -> Command {
    command!()
        .name("charityledger")
        .about("Bookkeeping for a small charity: sales, expenses, consumption, bank cash and family support")
        .arg(
            Arg::new("backend")
                .long("backend")
                .global(true)
                .num_args(1)
                .help("Storage backend: sqlite|json"),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .global(true)
                .num_args(1)
                .help("Directory holding the data files"),
        )
        .subcommand(Command::new("init").about("Create the data store"))
        .subcommand(crud("product", "Products bought for sale", product_fields))
        .subcommand(crud("custom-product", "Custom product names", |c, add| {
            catalog_fields(c, add, "kg|pack")
        }))
        .subcommand(crud("sale", "Sales and their arrears", sale_fields))
        .subcommand(crud("expense", "General expenses", expense_fields))
        .subcommand(crud("misc", "Miscellaneous expenses", misc_fields))
        .subcommand(crud("item", "Custom consumable items", |c, add| {
            catalog_fields(c, add, "kg|pack|piece|liter|dozen|gram|bottle|packet")
        }))
        .subcommand(crud("consume", "Items consumed", consume_fields))
        .subcommand(
            crud("bank", "Bank cash with running balance", bank_fields)
                .subcommand(output_args(
                    Command::new("summary").about("Account summary"),
                )),
        )
        .subcommand(
            Command::new("family")
                .about("Family support")
                .subcommand(crud("member", "Family members", member_fields))
                .subcommand(
                    crud("payment", "Family payments", payment_fields).subcommand(
                        Command::new("quick")
                            .about("Record this month's support for a member")
                            .arg(req("member", "Family member name"))
                            .arg(opt("date", "Payment date YYYY-MM-DD (default today)")),
                    ),
                )
                .subcommand(output_args(
                    Command::new("summary").about("Payment summary"),
                )),
        )
        .subcommand(
            Command::new("report")
                .about("Summaries")
                .subcommand(output_args(
                    Command::new("daily")
                        .about("Revenue, cost and profit per day")
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(clap::value_parser!(usize))
                                .help("Show only the most recent N days"),
                        ),
                ))
                .subcommand(output_args(
                    Command::new("monthly")
                        .about("Totals for one month")
                        .arg(opt("month", "YYYY-MM (default this month)")),
                ))
                .subcommand(output_args(
                    Command::new("totals").about("Totals over all records"),
                )),
        )
        .subcommand(
            Command::new("export")
                .about("Export a collection")
                .arg(req(
                    "collection",
                    "products|sales|expenses|misc_expenses|custom_items|custom_products|consumed_items|bank_transactions|family_payments|family_members",
                ))
                .arg(req("format", "csv|json"))
                .arg(req("out", "Output file")),
        )
        .subcommand(
            Command::new("doctor")
                .about("Check derived fields and references")
                .arg(
                    Arg::new("fix")
                        .long("fix")
                        .action(ArgAction::SetTrue)
                        .help("Recompute drifted arrears and running balances"),
                ),
        )
}
