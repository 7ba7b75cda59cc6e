use crate::models::guide_types::RecyclingGuide;

pub const RECYCLING_CENTERS_URL: &str = "https://www.google.com/maps/search/recycling+center+near+me";

const CARDBOARD: RecyclingGuide = RecyclingGuide {
    tips: &[
        "Flatten boxes before recycling.",
        "Keep cardboard dry and clean.",
        "Remove tape and labels if possible.",
    ],
    creative: &[
        "Use for crafts or kids projects.",
        "Make organizers or storage bins.",
        "Compost as brown material.",
    ],
    fact: "Recycling one ton of cardboard saves over 9 cubic yards of landfill space.",
};

const BOTTLE: RecyclingGuide = RecyclingGuide {
    tips: &[
        "Rinse bottles before recycling.",
        "Remove caps and labels.",
        "Check if your local center accepts this type.",
    ],
    creative: &[
        "Make planters or vases.",
        "Create DIY lamps or lights.",
        "Use for storage or crafts.",
    ],
    fact: "Recycling one plastic bottle saves enough energy to power a 60-watt light bulb for 6 hours.",
};

const CAN: RecyclingGuide = RecyclingGuide {
    tips: &[
        "Rinse cans before recycling.",
        "Crush to save space.",
        "Remove labels if possible.",
    ],
    creative: &[
        "Make pencil holders or organizers.",
        "Create lanterns or candle holders.",
        "Use in garden as plant markers.",
    ],
    fact: "Recycling one aluminum can saves enough energy to run a TV for 3 hours.",
};

pub const DEFAULT_GUIDE: RecyclingGuide = RecyclingGuide {
    tips: &[
        "Check your local recycling guidelines.",
        "Keep items clean and dry.",
    ],
    creative: &["Search online for upcycling ideas for this item."],
    fact: "Recycling helps conserve resources and reduce landfill waste.",
};

/// Checked in order; the first keyword contained in the label wins.
const GUIDES: &[(&str, RecyclingGuide)] = &[("cardboard", CARDBOARD), ("bottle", BOTTLE), ("can", CAN)];

pub fn guide_for(label: &str) -> RecyclingGuide {
    let label = label.to_lowercase();
    GUIDES
        .iter()
        .find(|(keyword, _)| label.contains(keyword))
        .map(|(_, guide)| *guide)
        .unwrap_or(DEFAULT_GUIDE)
}
