/// Benchmarks for RoyaleAPI response deserialization.
///
/// Clans and battle logs are the largest payloads the service returns, so they are
/// measured at several sizes.
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use royale_client_sdk::types::response::{Battle, Clan, Player, PopularPlayer};
use serde_json::json;

fn card(name: &str, maxed: bool) -> serde_json::Value {
    json!({
        "name": name,
        "level": if maxed { 13 } else { 11 },
        "maxLevel": 13,
        "count": 240,
        "rarity": "Common",
        "requiredForUpgrade": if maxed { json!("Maxed") } else { json!(800) },
        "icon": "https://royaleapi.github.io/cr-api-assets/cards-150/knight.png",
        "key": "knight",
        "elixir": 3,
        "type": "Troop",
        "arena": 0,
        "description": "A tough melee fighter.",
        "id": 26_000_000
    })
}

fn bench_player(c: &mut Criterion) {
    let mut group = c.benchmark_group("player");

    let cards: Vec<_> = (0..90).map(|i| card(&format!("Card {i}"), i % 3 == 0)).collect();
    let player = json!({
        "tag": "2PPCV",
        "name": "Tester",
        "trophies": 5123,
        "rank": null,
        "arena": { "name": "Legendary Arena", "arena": "Arena 12", "arenaID": 13, "trophyLimit": 4000 },
        "clan": {
            "tag": "9CQ2U8QJ",
            "name": "Royale",
            "role": "coLeader",
            "donations": 120,
            "donationsReceived": 80,
            "donationsDelta": 40,
            "badge": { "name": "Flame_01", "category": "01_Symbol", "id": 16_000_000 }
        },
        "stats": { "maxTrophies": 5300, "threeCrownWins": 2000, "cardsFound": 90, "level": 13 },
        "games": { "total": 9000, "wins": 5000, "winsPercent": 0.55, "losses": 3800, "lossesPercent": 0.42 },
        "currentDeck": &cards[..8],
        "cards": cards,
        "achievements": [{ "name": "Team Player", "stars": 3, "value": 1, "target": 1, "info": "Join a clan" }]
    })
    .to_string();

    group.throughput(Throughput::Bytes(player.len() as u64));
    group.bench_function("Player", |b| {
        b.iter(|| {
            let _: Player = serde_json::from_str(std::hint::black_box(&player))
                .expect("Deserialization should succeed");
        });
    });

    let popular = json!([{
        "popularity": { "hits": "2048", "hitsPerDayAvg": 68.3 },
        "tag": "2PPCV",
        "name": "Famous",
        "trophies": 6000
    }])
    .to_string();

    group.throughput(Throughput::Bytes(popular.len() as u64));
    group.bench_function("Vec<PopularPlayer>", |b| {
        b.iter(|| {
            let _: Vec<PopularPlayer> = serde_json::from_str(std::hint::black_box(&popular))
                .expect("Deserialization should succeed");
        });
    });

    group.finish();
}

fn bench_clan(c: &mut Criterion) {
    let mut group = c.benchmark_group("clan");

    for members in [10_usize, 50] {
        let roster: Vec<_> = (0..members)
            .map(|i| {
                json!({
                    "name": format!("Member {i}"),
                    "tag": format!("2P{i}"),
                    "rank": i + 1,
                    "previousRank": i + 1,
                    "role": "member",
                    "expLevel": 12,
                    "trophies": 5000 - i,
                    "donations": 200,
                    "donationsReceived": 120,
                    "donationsDelta": 80,
                    "donationsPercent": 1.5,
                    "arena": { "name": "Legendary Arena", "arena": "Arena 12", "arenaID": 13, "trophyLimit": 4000 }
                })
            })
            .collect();
        let clan = json!({
            "tag": "9CQ2U8QJ",
            "name": "Royale",
            "description": "Be active",
            "type": "inviteOnly",
            "score": 48_000,
            "memberCount": members,
            "requiredScore": 4000,
            "donations": 12_000,
            "badge": { "name": "Flame_01", "category": "01_Symbol", "id": 16_000_000 },
            "location": { "name": "United States", "isCountry": true, "code": "US" },
            "members": roster
        })
        .to_string();

        group.throughput(Throughput::Bytes(clan.len() as u64));
        group.bench_with_input(BenchmarkId::new("Clan", members), &clan, |b, json| {
            b.iter(|| {
                let _: Clan = serde_json::from_str(std::hint::black_box(json))
                    .expect("Deserialization should succeed");
            });
        });
    }

    group.finish();
}

fn bench_battles(c: &mut Criterion) {
    let mut group = c.benchmark_group("battles");

    let deck: Vec<_> = (0..8).map(|i| card(&format!("Card {i}"), i == 0)).collect();
    for count in [1_usize, 25] {
        let battles: Vec<_> = (0..count)
            .map(|i| {
                json!({
                    "type": "PvP",
                    "utcTime": 1_528_000_000 + i,
                    "teamSize": 1,
                    "winner": 1,
                    "teamCrowns": 2,
                    "opponentCrowns": 1,
                    "mode": { "name": "Ladder", "deck": "Own", "cardLevels": "Ladder", "overtimeSeconds": 120, "players": "1v1", "sameDeck": false },
                    "team": [{ "tag": "2PPCV", "name": "Tester", "crownsEarned": 2, "trophyChange": 30, "startTrophies": 5000, "deck": &deck }],
                    "opponent": [{ "tag": "8L9L9GL", "name": "Other", "crownsEarned": 1, "trophyChange": -30, "startTrophies": 5010, "deck": &deck }],
                    "arena": { "name": "Legendary Arena", "arenaID": 13 }
                })
            })
            .collect();
        let battles = serde_json::Value::from(battles).to_string();

        group.throughput(Throughput::Bytes(battles.len() as u64));
        group.bench_with_input(BenchmarkId::new("Vec<Battle>", count), &battles, |b, json| {
            b.iter(|| {
                let _: Vec<Battle> = serde_json::from_str(std::hint::black_box(json))
                    .expect("Deserialization should succeed");
            });
        });
    }

    group.finish();
}

criterion_group!(royale_benches, bench_player, bench_clan, bench_battles);
criterion_main!(royale_benches);
