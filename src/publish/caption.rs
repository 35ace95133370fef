//! Post captions. The same verse always gets the same caption; neighbouring
//! verses get different ones.

use crate::domain::VerseRecord;

/// Placeholders: `{ref}` = "Name c:v", `{name}`, `{c}`, `{v}`.
const STYLES: &[&str] = &[
    "{ref}\n\nSwipe to read the tafsir →",
    "Reflecting on {ref} today 🌙",
    "{ref}",
    "From {name}...\n\n{ref}",
    "What does this verse mean to you?\n\n{ref}",
    "Have you reflected on this today?\n\n{ref}",
    "Ever thought about this verse?\n\n{ref}",
    "Today's reflection: {ref} 🌅",
    "Morning reminder from {name} ☀️\n\n{ref}",
    "Tonight's verse: {ref} 🌙",
    "Daily Quran: {ref}",
    "This verse... SubhanAllah 🤍\n\n{ref}",
    "The words of Allah ✨\n\n{ref}",
    "Such a beautiful reminder 🤲\n\n{ref}",
    "Alhamdulillah for this guidance 🙏\n\n{ref}",
    "Read this. Reflect on it. Apply it.\n\n{ref}",
    "Swipe for the translation and tafsir →\n\n{ref}",
    "Take a moment to understand this verse\n\n{ref}",
    "Read slowly. Reflect deeply.\n\n{ref}",
    "From Surah {name}, verse {v} 📖",
    "Quran {c}:{v}",
    "Verse {v} of {name}",
    "Pause. Read. Reflect.\n\n{ref}",
    "A verse to ponder today 🤔\n\n{ref}",
    "Let this sink in...\n\n{ref}",
    "Food for thought 💭\n\n{ref}",
    "Sharing today's verse with you 💚\n\n{ref}",
    "May this benefit us all\n\n{ref}",
    "For everyone who needed this today\n\n{ref}",
    "📖 {ref}",
    "🌙 {ref}",
    "✨ {ref}",
    "A reminder from Allah\n\n{ref}",
    "Words of wisdom from the Quran\n\n{ref}",
    "Guidance from {name}\n\n{ref}",
    "Understanding {ref}",
    "Tafsir of {ref}",
    "Exploring {ref} today",
    "Learning from {ref}",
    "My reflection on {ref}",
    "Studying {ref} today",
    "Notes on {ref}",
];

const HASHTAG_SETS: &[&str] = &[
    "#Quran #HolyQuran #AlQuran #QuranDaily #QuranicVerses #Islam #Muslim #Allah #IslamicReminders #Deen #QuranicWisdom #Ayah #Surah #BookOfAllah",
    "#DailyQuran #QuranQuotes #QuranReading #QuranRecitation #TilawatEQuran #Tafsir #QuranTranslation #LearnQuran #QuranStudy #IslamicKnowledge #QuranicTeachings",
    "#Muslims #MuslimCommunity #Ummah #IslamicPost #MuslimLife #Alhamdulillah #SubhanAllah #MashaAllah #Taqwa #Iman #Faith #Sabr #IslamicQuotes",
    "#LearnIslam #IslamicEducation #Tafsir #QuranicStudies #QuranMeaning #SeekKnowledge #IslamicTeachings #QuranReflection #UnderstandQuran #QuranicGuidance",
    "#SpiritualGrowth #IslamicReminder #AllahsWords #DivineGuidance #QuranicHealing #PeaceInIslam #TrustInAllah #Dhikr #Dua #IslamicSpirituality #FaithInAllah",
];

/// Captions shorter than this get a call to action appended.
const SHORT_CAPTION: usize = 50;
const CTA_LINE: &str = "Swipe for translation & tafsir →";
const BRAND_TAG: &str = "#NectarFromQuran";

fn main_line(record: &VerseRecord) -> String {
    let (c, v) = (usize::from(record.chapter), usize::from(record.verse));
    let style = STYLES[(c * 1000 + v) % STYLES.len()];
    let reference = format!("{} {}:{}", record.chapter_name, c, v);

    style
        .replace("{ref}", &reference)
        .replace("{name}", &record.chapter_name)
        .replace("{c}", &c.to_string())
        .replace("{v}", &v.to_string())
}

pub fn hashtags(chapter: u16, verse: u16) -> &'static str {
    HASHTAG_SETS[(usize::from(chapter) + usize::from(verse)) % HASHTAG_SETS.len()]
}

pub fn build_caption(record: &VerseRecord) -> String {
    let main = main_line(record);
    let mut caption = main.clone();

    if main.chars().count() < SHORT_CAPTION {
        caption.push_str("\n\n");
        caption.push_str(CTA_LINE);
    }

    format!(
        "{}\n\n{}\n\n{}",
        caption,
        hashtags(record.chapter, record.verse),
        BRAND_TAG
    )
}
