//! Rule-reference-diagram script generation.
//!
//! Produces, per rule, a textual railroad-diagram expression that the
//! presentation layer feeds into its renderer. The script mirrors the
//! rule body shape: choices, sequences, EBNF cardinalities.

use crate::parser::{
    Alternative, AltList, Element, ElementAtom, EbnfSuffix, RuleDecl,
};

/// Build the diagram script for one rule.
pub fn rrd_script(rule: &RuleDecl) -> String {
    let mut script = String::from("Diagram(");
    if let Some(alts) = rule.alt_list() {
        script.push_str(&alt_list_script(&alts));
    }
    script.push_str(").addTo()");
    script
}

fn alt_list_script(alts: &AltList) -> String {
    let rendered: Vec<String> = alts.alternatives().map(|alt| alternative_script(&alt)).collect();
    match rendered.len() {
        0 => String::new(),
        1 => rendered.into_iter().next().unwrap_or_default(),
        _ => format!("Choice(0, {})", rendered.join(", ")),
    }
}

fn alternative_script(alt: &Alternative) -> String {
    let rendered: Vec<String> = alt
        .elements()
        .filter_map(|element| element_script(&element))
        .collect();
    match rendered.len() {
        0 => "Skip()".to_string(),
        1 => rendered.into_iter().next().unwrap_or_default(),
        _ => format!("Sequence({})", rendered.join(", ")),
    }
}

fn element_script(element: &Element) -> Option<String> {
    let body = match element.atom()? {
        ElementAtom::TokenRef(token) => format!("Terminal('{}')", token.text()),
        ElementAtom::RuleRef(token) => format!("NonTerminal('{}')", token.text()),
        ElementAtom::Literal(token) => {
            format!("Terminal({})", escape_literal(token.text()))
        }
        ElementAtom::CharSet(token) => format!("Terminal({})", escape_literal(token.text())),
        ElementAtom::Wildcard => "Terminal('.')".to_string(),
        ElementAtom::Range(range) => {
            let (low, high) = range.bounds();
            format!(
                "Terminal('{} .. {}')",
                low.map(|t| t.text().to_string()).unwrap_or_default(),
                high.map(|t| t.text().to_string()).unwrap_or_default()
            )
        }
        ElementAtom::Block(block) => block.alt_list().map(|alts| alt_list_script(&alts))?,
        ElementAtom::NotSet(_) => "Terminal('~set')".to_string(),
        // Actions and predicates don't show up in the diagram
        ElementAtom::Action { .. } => return None,
    };
    Some(match element.suffix() {
        Some(EbnfSuffix::Optional) => format!("Optional({body})"),
        Some(EbnfSuffix::ZeroOrMore) => format!("ZeroOrMore({body})"),
        Some(EbnfSuffix::OneOrMore) => format!("OneOrMore({body})"),
        None => body,
    })
}

/// Single-quote a literal's content for the diagram script
fn escape_literal(text: &str) -> String {
    let inner = text
        .trim_start_matches('\'')
        .trim_end_matches('\'')
        .replace('\\', "\\\\");
    format!("'{inner}'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{AstNode, GrammarFile, parse};

    fn first_rule(text: &str) -> RuleDecl {
        GrammarFile::cast(parse(text).syntax())
            .and_then(|f| f.rules().next())
            .expect("grammar with at least one rule")
    }

    #[test]
    fn test_sequence_script() {
        let rule = first_rule("grammar T;\nr: 'a' x B ;\n");
        assert_eq!(
            rrd_script(&rule),
            "Diagram(Sequence(Terminal('a'), NonTerminal('x'), Terminal('B'))).addTo()"
        );
    }

    #[test]
    fn test_choice_and_cardinalities() {
        let rule = first_rule("grammar T;\nr: a* | B? ;\n");
        assert_eq!(
            rrd_script(&rule),
            "Diagram(Choice(0, ZeroOrMore(NonTerminal('a')), Optional(Terminal('B')))).addTo()"
        );
    }

    #[test]
    fn test_empty_alternative_renders_skip() {
        let rule = first_rule("grammar T;\nr: 'a' | ;\n");
        assert_eq!(
            rrd_script(&rule),
            "Diagram(Choice(0, Terminal('a'), Skip())).addTo()"
        );
    }

    #[test]
    fn test_predicates_are_invisible() {
        let rule = first_rule("grammar T;\nr: {p}? 'a' ;\n");
        assert_eq!(rrd_script(&rule), "Diagram(Terminal('a')).addTo()");
    }
}
