// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::Ledger;
use crate::models::{FamilyMember, FamilyPayment, PaymentType, Record};
use crate::reports::family_summary;
use crate::utils::{
    arg_date, arg_decimal, arg_parse, arg_required, arg_string, fmt_money, fmt_opt,
    maybe_print_json, output_flags, pretty_table, today,
};
use anyhow::Result;

pub fn handle(ledger: &Ledger, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("member", sub)) => members(ledger, sub)?,
        Some(("payment", sub)) => payments(ledger, sub)?,
        Some(("summary", sub)) => {
            let (json_flag, jsonl_flag) = output_flags(sub);
            let payments: Vec<Record<FamilyPayment>> = ledger.list()?;
            let members: Vec<Record<FamilyMember>> = ledger.list()?;
            let s = family_summary(&payments, &members, today())?;
            if !maybe_print_json(json_flag, jsonl_flag, &s)? {
                let rows = vec![
                    vec!["Paid this month".into(), fmt_money(&s.total_paid_this_month)],
                    vec!["Paid this year".into(), fmt_money(&s.total_paid_this_year)],
                    vec!["Active members".into(), s.active_family_members.to_string()],
                    vec!["Upcoming payments".into(), s.upcoming_payments.to_string()],
                    vec!["Last payment".into(), fmt_opt(s.last_payment_date)],
                    vec!["Payments".into(), s.payment_count.to_string()],
                ];
                println!("{}", pretty_table(&["", "Value"], rows));
            }
        }
        _ => {}
    }
    Ok(())
}

fn members(ledger: &Ledger, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let member = ledger.create(FamilyMember {
                name: arg_required(sub, "name")?.to_string(),
                relationship: arg_string(sub, "relationship").unwrap_or_default(),
                monthly_amount: arg_decimal(sub, "monthly-amount")?,
                payment_day: arg_parse(sub, "payment-day")?,
                is_active: arg_parse(sub, "active")?.unwrap_or(true),
                notes: arg_string(sub, "notes"),
            })?;
            println!("Added family member '{}' ({})", member.data.name, member.id);
        }
        Some(("list", sub)) => {
            let (json_flag, jsonl_flag) = output_flags(sub);
            let data: Vec<Record<FamilyMember>> = ledger.list()?;
            if !maybe_print_json(json_flag, jsonl_flag, &data)? {
                let rows = data
                    .iter()
                    .map(|r| {
                        let f = &r.data;
                        vec![
                            r.id.clone(),
                            f.name.clone(),
                            f.relationship.clone(),
                            f.monthly_amount.map(|a| fmt_money(&a)).unwrap_or_default(),
                            fmt_opt(f.payment_day),
                            if f.is_active { "yes" } else { "no" }.to_string(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(
                        &["Id", "Name", "Relationship", "Monthly", "Day", "Active"],
                        rows
                    )
                );
            }
        }
        Some(("edit", sub)) => {
            let id = arg_required(sub, "id")?;
            let mut f = ledger.get::<FamilyMember>(id)?.data;
            if let Some(v) = arg_string(sub, "name") {
                f.name = v;
            }
            if let Some(v) = arg_string(sub, "relationship") {
                f.relationship = v;
            }
            if let Some(v) = arg_decimal(sub, "monthly-amount")? {
                f.monthly_amount = Some(v);
            }
            if let Some(v) = arg_parse(sub, "payment-day")? {
                f.payment_day = Some(v);
            }
            if let Some(v) = arg_parse(sub, "active")? {
                f.is_active = v;
            }
            if let Some(v) = arg_string(sub, "notes") {
                f.notes = Some(v);
            }
            ledger.update(id, f)?;
            println!("Updated family member {}", id);
        }
        Some(("rm", sub)) => {
            let id = arg_required(sub, "id")?;
            ledger.delete::<FamilyMember>(id)?;
            println!("Removed family member {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn payments(ledger: &Ledger, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let p = ledger.create(FamilyPayment {
                family_member_name: arg_required(sub, "member")?.to_string(),
                amount: arg_decimal(sub, "amount")?.unwrap_or_default(),
                payment_date: arg_date(sub, "date")?.unwrap_or_else(today),
                payment_type: arg_parse(sub, "type")?.unwrap_or(PaymentType::MonthlySupport),
                description: arg_string(sub, "description").unwrap_or_default(),
                notes: arg_string(sub, "notes"),
                is_recurring: arg_parse(sub, "recurring")?.unwrap_or(false),
                next_payment_due: arg_date(sub, "next-due")?,
            })?;
            println!(
                "Recorded payment of {} to {} ({})",
                fmt_money(&p.data.amount),
                p.data.family_member_name,
                p.id
            );
        }
        Some(("quick", sub)) => {
            let date = arg_date(sub, "date")?.unwrap_or_else(today);
            let draft = ledger.quick_payment(arg_required(sub, "member")?, date)?;
            let p = ledger.create(draft)?;
            println!(
                "Recorded monthly support of {} to {} ({}), next due {}",
                fmt_money(&p.data.amount),
                p.data.family_member_name,
                p.id,
                fmt_opt(p.data.next_payment_due)
            );
        }
        Some(("list", sub)) => {
            let (json_flag, jsonl_flag) = output_flags(sub);
            let mut data: Vec<Record<FamilyPayment>> = ledger.list()?;
            data.sort_by(|a, b| {
                b.data
                    .payment_date
                    .cmp(&a.data.payment_date)
                    .then(b.seq.cmp(&a.seq))
            });
            if !maybe_print_json(json_flag, jsonl_flag, &data)? {
                let rows = data
                    .iter()
                    .map(|r| {
                        let p = &r.data;
                        vec![
                            r.id.clone(),
                            p.payment_date.to_string(),
                            p.family_member_name.clone(),
                            p.payment_type.to_string(),
                            fmt_money(&p.amount),
                            p.description.clone(),
                            fmt_opt(p.next_payment_due),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(
                        &["Id", "Date", "Member", "Type", "Amount", "Description", "Next due"],
                        rows,
                    )
                );
            }
        }
        Some(("edit", sub)) => {
            let id = arg_required(sub, "id")?;
            let mut p = ledger.get::<FamilyPayment>(id)?.data;
            if let Some(v) = arg_string(sub, "member") {
                p.family_member_name = v;
            }
            if let Some(v) = arg_decimal(sub, "amount")? {
                p.amount = v;
            }
            if let Some(v) = arg_date(sub, "date")? {
                p.payment_date = v;
            }
            if let Some(v) = arg_parse(sub, "type")? {
                p.payment_type = v;
            }
            if let Some(v) = arg_string(sub, "description") {
                p.description = v;
            }
            if let Some(v) = arg_string(sub, "notes") {
                p.notes = Some(v);
            }
            if let Some(v) = arg_parse(sub, "recurring")? {
                p.is_recurring = v;
            }
            if let Some(v) = arg_date(sub, "next-due")? {
                p.next_payment_due = Some(v);
            }
            ledger.update(id, p)?;
            println!("Updated family payment {}", id);
        }
        Some(("rm", sub)) => {
            let id = arg_required(sub, "id")?;
            ledger.delete::<FamilyPayment>(id)?;
            println!("Removed family payment {}", id);
        }
        _ => {}
    }
    Ok(())
}
