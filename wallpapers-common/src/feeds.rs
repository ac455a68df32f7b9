use serde::{Deserialize, Serialize};

/// Channel used when every other source came back empty.
pub const DEFAULT_CHANNEL: &str = "wallpapers";

/// Built-in curated image boards.
pub const CHANNELS: &[&str] = &[
    "EarthPorn", "BotanicalPorn", "WaterPorn", "SeaPorn", "SkyPorn", "FirePorn",
    "DesertPorn", "WinterPorn", "AutumnPorn", "WeatherPorn", "GeologyPorn", "SpacePorn",
    "BeachPorn", "MushroomPorn", "SpringPorn", "SummerPorn", "LavaPorn", "LakePorn",
    "CityPorn", "VillagePorn", "RuralPorn", "ArchitecturePorn", "HousePorn", "CabinPorn",
    "ChurchPorn", "AbandonedPorn", "CemeteryPorn", "InfrastructurePorn", "MachinePorn",
    "CarPorn", "F1Porn", "MotorcyclePorn", "MilitaryPorn", "GunPorn", "KnifePorn",
    "BoatPorn", "RidesPorn", "DestructionPorn", "ThingsCutInHalfPorn", "StarshipPorn",
    "ToolPorn", "TechnologyPorn", "BridgePorn", "PolicePorn", "SteamPorn", "RetailPorn",
    "SpaceFlightPorn", "roadporn", "drydockporn", "AnimalPorn", "HumanPorn",
    "EarthlingPorn", "AdrenalinePorn", "ClimbingPorn", "SportsPorn", "AgriculturePorn",
    "TeaPorn", "BonsaiPorn", "FoodPorn", "CulinaryPorn", "DessertPorn", "DesignPorn",
    "RoomPorn", "AlbumArtPorn", "MetalPorn", "MoviePosterPorn", "TelevisionPosterPorn",
    "ComicBookPorn", "StreetArtPorn", "AdPorn", "ArtPorn", "FractalPorn", "InstrumentPorn",
    "ExposurePorn", "MacroPorn", "MicroPorn", "GeekPorn", "MTGPorn", "GamerPorn",
    "PowerWashingPorn", "AerialPorn", "OrganizationPorn", "FashionPorn", "AVPorn",
    "ApocalypsePorn", "InfraredPorn", "ViewPorn", "HellscapePorn", "sculptureporn",
    "HistoryPorn", "UniformPorn", "BookPorn", "NewsPorn", "QuotesPorn", "FuturePorn",
    "FossilPorn", "MegalithPorn", "ArtefactPorn", "AmateurEarthPorn", "AmateurPhotography",
    "ArtistOfTheDay", "BackgroundArt", "Conservation", "EarthPornVids", "EyeCandy", "FWEPP",
    "ImaginaryLandscapes", "ImaginaryWildlands", "IncredibleIndia", "ITookAPicture",
    "JoshuaTree", "NationalGeographic", "Nature", "NatureGifs", "NaturePics",
    "NotSafeForNature", "NZPhotos", "remoteplaces", "Schweiz", "SpecArt", "wallpapers",
    "InterstellarArt",
];

/// Built-in catalog categories.
pub const CATEGORIES: &[&str] = &[
    "3d", "abstract", "animals", "anime", "art", "black", "cars", "city", "dark", "fantasy",
    "flowers", "food", "holidays", "love", "macro", "minimalism", "motorcycles", "music",
    "nature", "other", "smilies", "space", "sport", "hi-tech", "textures", "vector", "words",
    "60_favorites",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feed {
    pub name: String,
    pub enabled: bool,
}

/// An ordered set of named feeds with per-feed enable flags.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeedSet {
    feeds: Vec<Feed>,
}

impl FeedSet {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            feeds: names
                .into_iter()
                .map(|name| Feed { name: name.into(), enabled: true })
                .collect(),
        }
    }

    pub fn channels() -> Self {
        Self::from_names(CHANNELS.iter().copied())
    }

    pub fn categories() -> Self {
        Self::from_names(CATEGORIES.iter().copied())
    }

    /// Enable or disable a feed; unknown names are appended.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) {
        match self.feeds.iter_mut().find(|f| f.name == name) {
            Some(feed) => feed.enabled = enabled,
            None => self.feeds.push(Feed { name: name.to_string(), enabled }),
        }
    }

    pub fn enabled(&self) -> impl Iterator<Item = &str> {
        self.feeds.iter().filter(|f| f.enabled).map(|f| f.name.as_str())
    }

    /// Canonical name of the enabled feed matching `name`, ignoring ASCII case.
    pub fn find_enabled(&self, name: &str) -> Option<&str> {
        self.enabled().find(|f| f.eq_ignore_ascii_case(name.trim()))
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.feeds.iter().any(|f| f.name == name && f.enabled)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feed> {
        self.feeds.iter()
    }

    pub fn len(&self) -> usize {
        self.feeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feeds.is_empty()
    }
}
