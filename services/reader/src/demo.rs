//! services/reader/src/demo.rs
//!
//! Built-in catalog of novels, so the chapter reader works without a backend.

use library_reader_core::domain::{Chapter, Novel, NovelWithContent};

fn novel(
    id: &str,
    title: &str,
    author: &str,
    description: &str,
    genre: &str,
    published_year: i32,
    rating: u8,
) -> Novel {
    Novel {
        id: id.to_string(),
        title: title.to_string(),
        author: author.to_string(),
        description: description.to_string(),
        genre: genre.to_string(),
        published_year,
        cover_image: String::new(),
        rating,
    }
}

/// The demo catalog, in display order.
pub fn novels() -> Vec<Novel> {
    vec![
        novel(
            "1",
            "Shadows of the Past",
            "Elena Martinez",
            "A researcher learns that her family's secrets are buried in an old manor where shadows come alive.",
            "Gothic Horror",
            2019,
            5,
        ),
        novel(
            "2",
            "The Blackwood Mystery",
            "Jonathan Rivers",
            "A detective returns to the village he fled as a boy to investigate a disappearance in the woods.",
            "Mystery",
            2021,
            4,
        ),
        novel(
            "3",
            "Lantern Tide",
            "Mara Okafor",
            "When the lighthouse goes dark, a coastal town starts hearing voices from the sea.",
            "Supernatural",
            2018,
            4,
        ),
        novel(
            "4",
            "The Quiet Ward",
            "Henrik Solberg",
            "A night nurse discovers that one room of the hospital has not been empty for a hundred years.",
            "Gothic Horror",
            2022,
            3,
        ),
    ]
}

/// The readable content of a novel, when the demo carries any.
pub fn content_for(novel_id: &str) -> Option<NovelWithContent> {
    let novel = novels().into_iter().find(|n| n.id == novel_id)?;
    if novel.id != "1" {
        return None;
    }
    Some(NovelWithContent {
        novel,
        chapters: vec![
            Chapter {
                id: "ch1".to_string(),
                number: 1,
                title: "The Return".to_string(),
                pages: vec![
                    "The road to the manor wound through a forest of bare trees. Elena had not \
                     been back in twenty years, yet every bend felt familiar."
                        .to_string(),
                    "The twin towers on either side of the entrance seemed to watch her arrive. \
                     The windows, dark and empty, were like blind eyes that somehow saw everything."
                        .to_string(),
                ],
            },
            Chapter {
                id: "ch2".to_string(),
                number: 2,
                title: "The Whispers Begin".to_string(),
                pages: vec![
                    "The key turned in the lock with a click that echoed through the empty hall. \
                     Dust floated in the thin rays of light that reached the floor."
                        .to_string(),
                    "The first whisper came when she was halfway down the corridor, so soft she \
                     took it for the wind. But there was no wind inside the house."
                        .to_string(),
                ],
            },
            Chapter {
                id: "ch3".to_string(),
                number: 3,
                title: "The Shadows Move".to_string(),
                pages: vec![
                    "Night fell over the manor like a velvet cloak. In the library she found her \
                     aunt's diary, its last entries written in an ever shakier hand."
                        .to_string(),
                    "In the kitchen the shadows cast by the single bulb began to move on their \
                     own, stretching in ways that had nothing to do with her."
                        .to_string(),
                ],
            },
        ],
    })
}
