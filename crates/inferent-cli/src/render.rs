//! Terminal rendering of facts, rules and explanation trails.

use colored::Colorize;
use inferent_engine::{Explanation, Origin};
use inferent_kb::{KnowledgeBase, Range, Rule, RuleIssue, TypedFact};
use std::collections::BTreeMap;
use std::fmt::Write;

pub fn fact_line(name: &str, fact: &TypedFact) -> String {
    let mut line = format!("{} : {}", name.bold(), fact.kind());
    match fact {
        TypedFact::Bool(f) => push_range(&mut line, f.range().map(bounds)),
        TypedFact::Int(f) => push_range(&mut line, f.range().map(bounds)),
        TypedFact::Float(f) => push_range(&mut line, f.range().map(bounds)),
        TypedFact::Enum(f) => {
            let _ = write!(line, " {{{}}}", f.variants().names().join(", "));
            push_range(&mut line, f.range_names());
        }
    }
    if !fact.description().is_empty() {
        let _ = write!(line, "  {}", format!("# {}", fact.description()).dimmed());
    }
    line
}

fn bounds<T: Copy>(range: &Range<T>) -> (T, T, bool) {
    (range.min, range.max, range.inclusive)
}

fn push_range<T: std::fmt::Display>(line: &mut String, range: Option<(T, T, bool)>) {
    if let Some((min, max, inclusive)) = range {
        let (open, close) = if inclusive { ('[', ']') } else { ('(', ')') };
        let _ = write!(line, " in {open}{min}, {max}{close}");
    }
}

pub fn rule_block(name: &str, rule: &Rule) -> String {
    let mut out = format!("{}", name.cyan().bold());
    if !rule.description.is_empty() {
        let _ = write!(out, "  {}", format!("# {}", rule.description).dimmed());
    }
    let _ = write!(out, "\n  {} {}", "IF".bold(), rule.antecedent);
    for assignment in &rule.consequent.assignments {
        let _ = write!(out, "\n  {} {}", "THEN".bold(), assignment);
    }
    out
}

pub fn knowledge_base(kb: &KnowledgeBase) -> String {
    let mut out = format!("{} ({})\n", "Facts".green().bold(), kb.facts.count());
    for (name, fact) in kb.facts.iter() {
        let _ = writeln!(out, "  {}", fact_line(name, fact));
    }
    let _ = writeln!(out, "\n{} ({})", "Rules".green().bold(), kb.rules.count());
    for (name, rule) in kb.rules.iter() {
        let _ = writeln!(out, "{}", rule_block(name, rule));
    }
    out
}

pub fn issues(report: &BTreeMap<String, Vec<RuleIssue>>) -> String {
    let mut out = String::new();
    for (rule, issues) in report {
        let _ = writeln!(out, "{}", rule.cyan().bold());
        for issue in issues {
            let marker = if issue.blocks_trigger() {
                "blocked:".red().bold()
            } else {
                "warning:".yellow().bold()
            };
            let _ = writeln!(out, "  {marker} {issue}");
        }
    }
    out
}

pub fn explanation(explanation: &Explanation) -> String {
    let mut out = String::new();
    for (index, round) in explanation.rounds.iter().enumerate() {
        let _ = writeln!(out, "{}", format!("Round {index}").green().bold());
        for log in &round.logs {
            let label = match &log.origin {
                Origin::Rule(_) => log.origin.to_string().cyan().bold(),
                _ => log.origin.to_string().bold(),
            };
            let _ = writeln!(out, "  {label}");
            if log.assignments.is_empty() && log.rejected.is_empty() {
                let _ = writeln!(out, "    {}", "(nothing)".dimmed());
            }
            for (fact, value) in &log.assignments {
                let _ = writeln!(out, "    {fact} = {value}");
            }
            for fact in &log.rejected {
                let _ = writeln!(out, "    {} {fact}", "rejected".red());
            }
        }
    }
    let _ = writeln!(out, "{} {}", "Finished:".bold(), explanation.reason);
    out
}
