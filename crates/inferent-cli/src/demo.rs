//! A small weather-advice system used by `inferent demo` and the tests.

use inferent_kb::{
    Antecedent, Assignment, Comparator, Condition, Confidence, Consequent, DynamicEnum, EnumFact,
    KbResult, KnowledgeBase, Rule, TypedFact, ValueKind,
};

pub fn knowledge_base() -> KbResult<KnowledgeBase> {
    let mut kb = KnowledgeBase::new();
    let facts = &mut kb.facts;

    facts
        .create("raining", ValueKind::Bool)?
        .set_description("Is it raining?");
    facts
        .insert(
            "wind",
            TypedFact::Enum(EnumFact::new(DynamicEnum::from_names([
                "calm", "breezy", "gale",
            ]))),
        )?
        .set_description("How windy is it?");
    if let TypedFact::Int(temperature) = facts.create("temperature", ValueKind::Int)? {
        temperature.set_range(-40, 50, true)?;
        temperature.set_description("Outside temperature in degrees Celsius");
    }
    facts
        .create("umbrella", ValueKind::Bool)?
        .set_description("Take an umbrella");
    facts
        .insert(
            "coat",
            TypedFact::Enum(EnumFact::new(DynamicEnum::from_names([
                "none", "light", "heavy",
            ]))),
        )?
        .set_description("Which coat to wear");
    facts
        .create("stay_home", ValueKind::Bool)?
        .set_description("Better not to go out");

    let rules = &mut kb.rules;
    let raining = Condition::new("raining", Comparator::EqualTo, true, Confidence::new(0.5));
    let gale = |threshold: Confidence| {
        Condition::new("wind", Comparator::EqualTo, "gale".to_string(), threshold)
    };
    rules.insert(
        "umbrella",
        Rule::new(
            Antecedent::new(raining).and(gale(Confidence::NONE).inverted()),
            Consequent::new().with(Assignment::new("umbrella", true, Confidence::new(0.9))),
        )
        .with_description("Rain without a gale calls for an umbrella"),
    )?;

    let coat = |name: &str, confidence: Confidence| {
        Consequent::new().with(Assignment::new("coat", name.to_string(), confidence))
    };
    let colder = |limit: i64| {
        Condition::new("temperature", Comparator::LessThan, limit, Confidence::NONE)
    };
    let warmer = |limit: i64| {
        Condition::new("temperature", Comparator::GreaterThan, limit, Confidence::NONE)
    };
    rules.insert(
        "heavy-coat",
        Rule::new(Antecedent::new(colder(5)), coat("heavy", Confidence::CERTAIN)),
    )?;
    rules.insert(
        "light-coat",
        Rule::new(
            Antecedent::new(warmer(4)).and(colder(16)),
            coat("light", Confidence::new(0.8)),
        ),
    )?;
    rules.insert(
        "no-coat",
        Rule::new(Antecedent::new(warmer(15)), coat("none", Confidence::new(0.8))),
    )?;

    rules.insert(
        "stay-home",
        Rule::new(
            Antecedent::new(gale(Confidence::new(0.7))).or(colder(-20)),
            Consequent::new()
                .with(Assignment::new("stay_home", true, Confidence::new(0.9)))
                .with(Assignment::new("umbrella", false, Confidence::new(0.9))),
        )
        .with_description("Gales and deep frost keep people inside"),
    )?;
    Ok(kb)
}
