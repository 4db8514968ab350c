//! Response types for the RoyaleAPI endpoints.
//!
//! The service omits fields freely, so most structs decode missing fields as their
//! default value. Objects that may be `null` (a clanless player's clan, a season that
//! was never played) are `Option`s.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use serde_with::{DisplayFromStr, PickFirst, serde_as};

use super::{ClanRole, ClanType, TournamentStatus};

/// `requiredForUpgrade` is a card count, or the string `"Maxed"` once the card is at
/// its maximum level. Any string decodes to `-1`.
fn deserialize_required_for_upgrade<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum CountOrLabel {
        Count(i32),
        Label(String),
    }

    Ok(match CountOrLabel::deserialize(deserializer)? {
        CountOrLabel::Count(count) => count,
        CountOrLabel::Label(_) => Card::MAXED,
    })
}

/// A player's profile with basic stats and card collection.
///
/// See <https://docs.royaleapi.com/#/endpoints/player>.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct Player {
    pub tag: String,
    pub name: String,
    pub trophies: u32,
    /// Global ranking, when the player is on the leaderboard.
    pub rank: Option<u32>,
    pub arena: Arena,
    pub clan: Option<PlayerClan>,
    pub stats: PlayerStats,
    pub games: PlayerGames,
    pub league_statistics: Option<LeagueStatistics>,
    /// Link to copy the player's deck in game.
    pub deck_link: String,
    pub current_deck: Vec<Card>,
    pub cards: Vec<Card>,
    pub achievements: Vec<Achievement>,
}

/// A trophy range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct Arena {
    pub name: String,
    /// Level within a league, e.g. `"League 3"`.
    pub arena: String,
    /// Position in the hierarchy of arenas.
    #[serde(rename = "arenaID", alias = "arenaId")]
    pub arena_id: u32,
    /// Upper bound of the arena's trophy range.
    pub trophy_limit: u32,
}

/// A player's standing within their clan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct PlayerClan {
    pub tag: String,
    pub name: String,
    pub role: Option<ClanRole>,
    pub donations: u32,
    pub donations_received: u32,
    pub donations_delta: i32,
    pub badge: Badge,
}

/// A clan's badge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct Badge {
    pub name: String,
    pub category: String,
    pub id: u32,
    /// Link to the badge image.
    pub image: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct PlayerStats {
    pub tournament_cards_won: u32,
    pub max_trophies: u32,
    pub three_crown_wins: u32,
    pub cards_found: u32,
    pub favorite_card: Option<CardInfo>,
    pub total_donations: u32,
    pub challenge_max_wins: u32,
    pub challenge_cards_won: u32,
    pub level: u32,
}

/// How many games of each outcome a player has played.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct PlayerGames {
    pub total: u32,
    pub tournament_games: u32,
    pub wins: u32,
    pub war_day_wins: u32,
    pub wins_percent: f64,
    pub losses: u32,
    pub losses_percent: f64,
    pub draws: u32,
    pub draws_percent: f64,
}

/// A player's ladder seasons.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct LeagueStatistics {
    pub current_season: Option<Season>,
    pub previous_season: Option<Season>,
    pub best_season: Option<Season>,
}

/// One ladder season. Which fields are present depends on the season being described.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct Season {
    /// Season identifier, e.g. `"2018-06"`. Absent for the current season.
    pub id: Option<String>,
    pub rank: Option<u32>,
    pub trophies: u32,
    pub best_trophies: Option<u32>,
}

/// Static description of a card, without a player's progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct CardInfo {
    pub name: String,
    pub id: u32,
    pub max_level: u32,
    pub icon: String,
    pub key: String,
    pub elixir: u32,
    #[serde(rename = "type")]
    pub card_type: String,
    pub rarity: String,
    pub arena: u32,
    pub description: String,
}

/// A card in a player's collection or deck.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct Card {
    pub name: String,
    pub level: u32,
    pub max_level: u32,
    pub count: u32,
    pub rarity: String,
    /// Cards needed for the next level, or [`Card::MAXED`] once at max level.
    #[serde(deserialize_with = "deserialize_required_for_upgrade")]
    pub required_for_upgrade: i32,
    pub icon: String,
    pub key: String,
    pub elixir: u32,
    #[serde(rename = "type")]
    pub card_type: String,
    pub arena: u32,
    pub description: String,
    pub id: u32,
}

impl Card {
    /// Value of [`Card::required_for_upgrade`] for a card at its maximum level.
    pub const MAXED: i32 = -1;

    #[must_use]
    pub fn is_maxed(&self) -> bool {
        self.required_for_upgrade == Self::MAXED
    }
}

/// Progress towards an achievement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct Achievement {
    pub name: String,
    pub stars: u32,
    pub value: u32,
    /// Value needed to complete the achievement.
    pub target: u32,
    pub info: String,
}

/// A match that was played.
///
/// See <https://docs.royaleapi.com/#/endpoints/player_battles>.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct Battle {
    #[serde(rename = "type")]
    pub battle_type: String,
    pub challenge_type: String,
    pub mode: BattleMode,
    pub win_count_before: u32,
    /// Unix timestamp in seconds.
    pub utc_time: i64,
    pub deck_type: String,
    pub team_size: u32,
    /// Team crowns minus opponent crowns: zero is a draw, positive a win.
    pub winner: i32,
    pub team_crowns: u32,
    pub opponent_crowns: u32,
    pub team: Vec<TeamMember>,
    pub opponent: Vec<TeamMember>,
    pub arena: Arena,
}

impl Battle {
    #[must_use]
    pub fn is_win(&self) -> bool {
        self.winner > 0
    }

    #[must_use]
    pub fn is_draw(&self) -> bool {
        self.winner == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct BattleMode {
    pub name: String,
    pub deck: String,
    pub card_levels: String,
    pub overtime_seconds: u32,
    pub players: String,
    pub same_deck: bool,
}

/// One side of a [`Battle`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct TeamMember {
    pub tag: String,
    pub name: String,
    pub crowns_earned: u32,
    pub trophy_change: i32,
    pub start_trophies: u32,
    pub clan: Option<TeamClan>,
    pub deck_link: String,
    pub deck: Vec<Card>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct TeamClan {
    pub tag: String,
    pub name: String,
    pub badge: Badge,
}

/// A player's upcoming chests. The named chests hold how many chests away each is.
///
/// See <https://docs.royaleapi.com/#/endpoints/player_chests>.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct PlayerChests {
    pub upcoming: Vec<String>,
    pub super_magical: u32,
    pub magical: u32,
    pub legendary: u32,
    pub epic: u32,
    pub giant: u32,
}

/// A country or region.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct Location {
    pub name: String,
    pub is_country: bool,
    pub code: String,
}

/// A clan as returned by the clan search endpoint.
///
/// See <https://docs.royaleapi.com/#/endpoints/clan_search>.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct ClanSearchResult {
    pub tag: String,
    pub name: String,
    #[serde(rename = "type")]
    pub clan_type: Option<ClanType>,
    pub score: u32,
    pub member_count: u32,
    pub required_score: u32,
    pub donations: u32,
    pub badge: Badge,
    pub location: Location,
}

/// A clan with its members.
///
/// See <https://docs.royaleapi.com/#/endpoints/clan>.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct Clan {
    pub tag: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub clan_type: Option<ClanType>,
    pub score: u32,
    pub member_count: u32,
    pub required_score: u32,
    pub donations: u32,
    pub clan_chest: Option<ClanChest>,
    pub badge: Badge,
    pub location: Location,
    pub members: Vec<ClanMember>,
}

/// Retired from the game but still reported by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct ClanChest {
    pub status: String,
    pub crowns: u32,
    pub level: u32,
    pub max_level: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct ClanMember {
    pub name: String,
    pub tag: String,
    /// Ranking within the clan.
    pub rank: u32,
    pub previous_rank: u32,
    pub role: Option<ClanRole>,
    pub exp_level: u32,
    pub trophies: u32,
    pub clan_chest_crowns: u32,
    pub donations: u32,
    pub donations_received: u32,
    pub donations_delta: i32,
    pub donations_percent: f64,
    pub arena: Arena,
}

/// The clan war a clan is currently taking part in.
///
/// See <https://docs.royaleapi.com/#/endpoints/clan_war>.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct ClanWar {
    /// `notInWar`, `collectionDay` or `warDay`.
    pub state: String,
    pub war_end_time: Option<i64>,
    pub collection_end_time: Option<i64>,
    pub clan: Option<ClanWarClan>,
    pub participants: Vec<ClanWarParticipant>,
    pub standings: Vec<ClanWarClan>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct ClanWarClan {
    pub tag: String,
    pub name: String,
    pub participants: u32,
    pub battles_played: u32,
    pub wins: u32,
    pub crowns: u32,
    pub war_trophies: u32,
    /// Only reported in the war log.
    pub war_trophies_change: Option<i32>,
    pub badge: Badge,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct ClanWarParticipant {
    pub tag: String,
    pub name: String,
    pub cards_earned: u32,
    pub battles_played: u32,
    pub wins: u32,
}

/// A finished clan war.
///
/// See <https://docs.royaleapi.com/#/endpoints/clan_warlog>.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct ClanWarLogEntry {
    pub created_date: i64,
    pub season_number: u32,
    pub participants: Vec<ClanWarParticipant>,
    pub standings: Vec<ClanWarClan>,
}

/// One snapshot of a tracked clan, keyed by its timestamp in the history response.
///
/// See <https://docs.royaleapi.com/#/endpoints/clan_history>.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct ClanHistoryEntry {
    pub donations: u32,
    pub member_count: u32,
    pub members: Vec<ClanHistoryMember>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct ClanHistoryMember {
    pub clan_rank: u32,
    pub crowns: u32,
    pub donations: u32,
    pub name: String,
    pub tag: String,
    pub trophies: u32,
}

/// Whether the service keeps history snapshots for a clan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct Tracking {
    pub active: bool,
    pub available: bool,
    pub snapshot_count: u32,
}

/// See <https://docs.royaleapi.com/#/endpoints/clan_tracking>.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct ClanTracking {
    pub tag: String,
    #[serde(flatten)]
    pub tracking: Tracking,
}

/// A tournament as listed by the open, known, 1k and prep endpoints.
///
/// See <https://docs.royaleapi.com/#/endpoints/tournaments_open>.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct Tournament {
    pub tag: String,
    #[serde(rename = "type")]
    pub tournament_type: String,
    pub status: Option<TournamentStatus>,
    pub name: String,
    pub capacity: u32,
    pub player_count: u32,
    pub max_capacity: u32,
    /// Seconds.
    pub preparation_duration: u32,
    /// Seconds.
    pub duration: u32,
    pub create_time: i64,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
}

/// A single tournament with its description and members.
///
/// See <https://docs.royaleapi.com/#/endpoints/tournaments>.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct TournamentDetails {
    #[serde(flatten)]
    pub tournament: Tournament,
    pub description: String,
    pub creator: Option<TournamentMember>,
    pub members: Vec<TournamentMember>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct TournamentMember {
    pub tag: String,
    pub name: String,
    pub score: u32,
    pub rank: Option<u32>,
}

/// See <https://docs.royaleapi.com/#/endpoints/tournaments_search>.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct TournamentSearchEntry {
    pub tag: String,
    #[serde(rename = "type")]
    pub tournament_type: String,
    pub status: Option<TournamentStatus>,
    pub creator_tag: String,
    pub name: String,
    pub max_capacity: u32,
    pub preparation_duration: u32,
    pub duration: u32,
    pub create_time: i64,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub player_count: u32,
    pub members: Vec<TournamentMember>,
}

/// A clan on a leaderboard.
///
/// See <https://docs.royaleapi.com/#/endpoints/top_clans>.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct TopClan {
    pub tag: String,
    pub name: String,
    pub score: u32,
    pub member_count: u32,
    pub rank: u32,
    pub previous_rank: u32,
    pub badge: Badge,
    pub location: Location,
}

/// A player on a leaderboard.
///
/// See <https://docs.royaleapi.com/#/endpoints/top_players>.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct TopPlayer {
    pub name: String,
    pub tag: String,
    pub rank: u32,
    pub previous_rank: u32,
    pub exp_level: u32,
    pub trophies: u32,
    pub donations_delta: i32,
    pub clan: Option<TeamClan>,
    pub arena: Arena,
}

/// How often an item has been requested from the service.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct Popularity {
    /// Reported as a number or a numeric string depending on the endpoint.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub hits: u64,
    pub hits_per_day_avg: f64,
}

/// See <https://docs.royaleapi.com/#/endpoints/popular_clans>.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct PopularClan {
    pub popularity: Popularity,
    #[serde(flatten)]
    pub clan: Clan,
    pub tracking: Option<Tracking>,
}

/// See <https://docs.royaleapi.com/#/endpoints/popular_players>.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct PopularPlayer {
    pub popularity: Popularity,
    #[serde(flatten)]
    pub player: Player,
}

/// See <https://docs.royaleapi.com/#/endpoints/popular_tournaments>.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct PopularTournament {
    pub popularity: Popularity,
    #[serde(flatten)]
    pub tournament: TournamentDetails,
}

/// See <https://docs.royaleapi.com/#/endpoints/popular_decks>.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct PopularDeck {
    /// Number of times the deck was seen.
    pub popularity: u64,
    pub cards: Vec<CardInfo>,
    pub deck_link: String,
}

/// Usage information for the token the client authenticates with.
///
/// See <https://docs.royaleapi.com/#/endpoints/auth_stats>.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct ApiKeyStats {
    pub id: String,
    /// Unix timestamp in seconds.
    pub last_request: i64,
    /// Requests per day, keyed by date.
    pub request_count: BTreeMap<String, u64>,
}

/// Game data that rarely changes: arenas, cards, rarities, regions and more.
///
/// The deeply nested tables (card statistics, chest cycles, clan chest rewards,
/// challenges) are kept as raw JSON.
///
/// See <https://docs.royaleapi.com/#/endpoints/constants>.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct Constants {
    pub alliance_badges: Vec<Badge>,
    pub arenas: Vec<ConstantsArena>,
    pub cards: Vec<ConstantsCard>,
    pub cards_stats: serde_json::Value,
    pub challenges: serde_json::Value,
    pub chest_order: serde_json::Value,
    pub clan_chest: serde_json::Value,
    pub game_modes: Vec<GameMode>,
    pub rarities: Vec<Rarity>,
    pub regions: Vec<Region>,
    pub tournaments: Vec<ConstantsTournament>,
    pub treasure_chests: serde_json::Value,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct ConstantsArena {
    pub id: u32,
    pub key: String,
    pub name: String,
    pub arena: u32,
    pub title: String,
    pub subtitle: String,
    #[serde(rename = "arena_id", alias = "arenaID")]
    pub arena_id: u32,
    #[serde(rename = "league_id", alias = "leagueID")]
    pub league_id: u32,
    pub trophy_limit: u32,
    pub demote_trophy_limit: u32,
    pub season_trophy_reset: u32,
    pub is_in_use: bool,
    pub training_camp: bool,
    pub season_reward_chest: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct ConstantsCard {
    pub key: String,
    pub name: String,
    pub elixir: u32,
    #[serde(rename = "type")]
    pub card_type: String,
    pub rarity: String,
    pub arena: u32,
    pub description: String,
    pub id: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct GameMode {
    pub id: u32,
    pub name: String,
    pub name_en: String,
    pub card_level_adjustment: String,
    pub deck_selection: String,
    pub overtime_seconds: u32,
    pub players: String,
    pub same_deck_on_both: bool,
    pub gives_clan_score: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct Rarity {
    pub name: String,
    pub level_count: u32,
    pub relative_level: u32,
    pub donate_capacity: u32,
    pub gold_conversion_value: u32,
    pub upgrade_material_count: Vec<u32>,
    pub upgrade_cost: Vec<u32>,
    pub upgrade_exp: Vec<u32>,
}

/// A location usable as a leaderboard or clan search filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct Region {
    pub id: u32,
    pub key: String,
    pub name: String,
    #[serde(rename = "isCountry", alias = "is_country")]
    pub is_country: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct ConstantsTournament {
    pub key: String,
    pub create_cost: u32,
    pub max_players: u32,
    pub prizes: Vec<TournamentPrize>,
    pub cards: Vec<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct TournamentPrize {
    pub rank: u32,
    pub cards: u32,
    pub tier: u32,
}
