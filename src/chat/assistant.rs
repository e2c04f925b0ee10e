// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

/// Canned answer chosen by lower-cased substring match. The first matching
/// rule wins.
pub fn fallback_reply(message: &str) -> &'static str {
    const RULES: [(&[&str], &str); 6] = [
        (
            &["hello", "hi"],
            "Hello! I'm your energy assistant. How can I help you save on your electricity bill today?",
        ),
        (
            &["save", "reduce"],
            "Here are quick energy-saving tips: Use LED bulbs, unplug devices when not in use, set AC to 78°F, and run appliances during off-peak hours. These can reduce your bill by 15-25%.",
        ),
        (
            &["bill", "cost"],
            "To lower your electricity bill, try: adjusting thermostat settings, using energy-efficient appliances, improving home insulation, and switching to time-of-use plans if available.",
        ),
        (
            &["appliance", "device"],
            "Major energy consumers are: AC/heating (40-50%), water heater (15-20%), lighting (10-15%), and electronics (5-10%). Focus on these for maximum savings.",
        ),
        (
            &["peak", "time"],
            "Peak hours are typically 4-9 PM weekdays. Avoid using heavy appliances during this time. Run dishwashers, washing machines, and dryers during off-peak hours to save money.",
        ),
        (
            &["solar", "renewable"],
            "Solar panels can reduce your bill by 70-90%. Consider factors like roof orientation, local incentives, and payback period. Many areas offer net metering for excess power.",
        ),
    ];

    let lower = message.to_lowercase();
    RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, reply)| *reply)
        .unwrap_or(
            "I'm here to help you save energy and reduce costs! Ask me about lowering your bill, understanding usage, optimizing appliances, or renewable energy options.",
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_routing() {
        assert!(fallback_reply("Hello there").starts_with("Hello!"));
        assert!(fallback_reply("How do I REDUCE usage?").starts_with("Here are quick"));
        assert!(fallback_reply("what drives cost").starts_with("To lower"));
        assert!(fallback_reply("tell me about each device").starts_with("Major energy"));
        assert!(fallback_reply("solar panels?").starts_with("Solar panels"));
        assert!(fallback_reply("???").starts_with("I'm here to help"));
    }

    #[test]
    fn substring_matching_is_not_word_based() {
        // "this" contains "hi"
        assert!(fallback_reply("is this expensive").starts_with("Hello!"));
    }
}
