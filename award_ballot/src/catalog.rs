// ********* Contest catalog ***********
//
// The catalog is static configuration for one contest edition: a fixed,
// ordered list of categories, each with its fixed nominee slate. Every
// ballot of a given edition shares the same catalog; nothing here is
// mutated at runtime.

/// One award category: its display name and the ordered nominee slate.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct CategoryInfo {
    pub name: &'static str,
    pub nominees: &'static [&'static str],
}

/// The number of categories in the contest.
pub const CATEGORY_COUNT: usize = 20;

/// The 98th Academy Awards slate, in announcement order.
pub const CATALOG: [CategoryInfo; CATEGORY_COUNT] = [
    CategoryInfo {
        name: "Best Picture",
        nominees: &[
            "Bugonia",
            "F1",
            "Frankenstein",
            "Hamnet",
            "Marty Supreme",
            "One Battle After Another",
            "The Secret Agent",
            "Sentimental Value",
            "Sinners",
            "Train Dreams",
        ],
    },
    CategoryInfo {
        name: "Best Director",
        nominees: &[
            "Chloé Zhao – Hamnet",
            "Josh Safdie – Marty Supreme",
            "Paul Thomas Anderson – One Battle After Another",
            "Joachim Trier – Sentimental Value",
            "Ryan Coogler – Sinners",
        ],
    },
    CategoryInfo {
        name: "Best Actress",
        nominees: &[
            "Jessie Buckley – Hamnet",
            "Rose Byrne – If I Had Legs I'd Kick You",
            "Kate Hudson – Song Sung Blue",
            "Renate Reinsve – Sentimental Value",
            "Emma Stone – Bugonia",
        ],
    },
    CategoryInfo {
        name: "Best Actor",
        nominees: &[
            "Timothée Chalamet – Marty Supreme",
            "Leonardo DiCaprio – One Battle After Another",
            "Ethan Hawke – Blue Moon",
            "Michael B. Jordan – Sinners",
            "Wagner Moura – The Secret Agent",
        ],
    },
    CategoryInfo {
        name: "Best Supporting Actress",
        nominees: &[
            "Elle Fanning – Sentimental Value",
            "Inga Ibsdotter Lilleaas – Sentimental Value",
            "Amy Madigan – Weapons",
            "Wunmi Mosaku – Sinners",
            "Teyana Taylor – One Battle After Another",
        ],
    },
    CategoryInfo {
        name: "Best Supporting Actor",
        nominees: &[
            "Benicio Del Toro – One Battle After Another",
            "Jacob Elordi – Frankenstein",
            "Delroy Lindo – Sinners",
            "Sean Penn – One Battle After Another",
            "Stellan Skarsgård – Sentimental Value",
        ],
    },
    CategoryInfo {
        name: "Best Original Screenplay",
        nominees: &[
            "Blue Moon",
            "It Was Just an Accident",
            "Marty Supreme",
            "Sentimental Value",
            "Sinners",
        ],
    },
    CategoryInfo {
        name: "Best Adapted Screenplay",
        nominees: &[
            "Bugonia",
            "Frankenstein",
            "Hamnet",
            "One Battle After Another",
            "Train Dreams",
        ],
    },
    CategoryInfo {
        name: "Best Animated Feature",
        nominees: &[
            "Arco",
            "Elio",
            "KPop Demon Hunters",
            "Little Amélie or the Character of Rain",
            "Zootopia 2",
        ],
    },
    CategoryInfo {
        name: "Best International Feature",
        nominees: &[
            "It Was Just an Accident (France)",
            "The Secret Agent (Brazil)",
            "Sentimental Value (Norway)",
            "Sirāt (Spain)",
            "The Voice of Hind Rajab (Tunisia)",
        ],
    },
    CategoryInfo {
        name: "Best Documentary Feature",
        nominees: &[
            "The Alabama Solution",
            "Come See Me in the Good Light",
            "Cutting Through Rocks",
            "Mr. Nobody Against Putin",
            "The Perfect Neighbor",
        ],
    },
    CategoryInfo {
        name: "Best Original Score",
        nominees: &[
            "Bugonia",
            "Frankenstein",
            "Hamnet",
            "One Battle After Another",
            "Sinners",
        ],
    },
    CategoryInfo {
        name: "Best Original Song",
        nominees: &[
            "\"Dear Me\" – Diane Warren: Relentless",
            "\"Golden\" – KPop Demon Hunters",
            "\"I Lied To You\" – Sinners",
            "\"Sweet Dreams of Joy\" – Viva Verdi",
            "\"Train Dreams\" – Train Dreams",
        ],
    },
    CategoryInfo {
        name: "Best Cinematography",
        nominees: &[
            "Frankenstein",
            "Marty Supreme",
            "One Battle After Another",
            "Sinners",
            "Train Dreams",
        ],
    },
    CategoryInfo {
        name: "Best Film Editing",
        nominees: &[
            "F1",
            "Marty Supreme",
            "One Battle After Another",
            "Sentimental Value",
            "Sinners",
        ],
    },
    CategoryInfo {
        name: "Best Production Design",
        nominees: &[
            "Frankenstein",
            "Hamnet",
            "Marty Supreme",
            "One Battle After Another",
            "Sinners",
        ],
    },
    CategoryInfo {
        name: "Best Costume Design",
        nominees: &[
            "Avatar: Fire and Ash",
            "Frankenstein",
            "Hamnet",
            "Marty Supreme",
            "Sinners",
        ],
    },
    CategoryInfo {
        name: "Best Makeup and Hairstyling",
        nominees: &[
            "Frankenstein",
            "Kokuho",
            "Sinners",
            "The Smashing Machine",
            "The Ugly Stepsister",
        ],
    },
    CategoryInfo {
        name: "Best Sound",
        nominees: &[
            "F1",
            "Frankenstein",
            "One Battle After Another",
            "Sinners",
            "Sirāt",
        ],
    },
    CategoryInfo {
        name: "Best Visual Effects",
        nominees: &[
            "Avatar: Fire and Ash",
            "F1",
            "Jurassic World Rebirth",
            "The Lost Bus",
            "Sinners",
        ],
    },
];

/// Looks up a category by its display name.
pub fn find_category(name: &str) -> Option<&'static CategoryInfo> {
    CATALOG.iter().find(|c| c.name == name)
}

/// The category names in announcement order.
pub fn category_names() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|c| c.name)
}

/// Checks that `nominee` is on the slate of `category`.
///
/// Nominee labels are matched exactly; there is no normalization or
/// prefix matching at this layer.
pub fn require_nominee(category: &str, nominee: &str) -> Result<(), crate::BallotError> {
    let info = find_category(category)
        .ok_or_else(|| crate::BallotError::UnknownCategory(category.to_string()))?;
    if info.nominees.contains(&nominee) {
        Ok(())
    } else {
        Err(crate::BallotError::UnknownNominee {
            category: category.to_string(),
            nominee: nominee.to_string(),
        })
    }
}
