/// 목 데이터 소스 시드 데이터
/// 시간은 모두 기준 시각(now) 기준 상대값
// region:    --- Imports
use crate::auction::model::{Auction, AuctionStatus, Bid, Car, CarCondition};
use chrono::{DateTime, Duration, Utc};

// endregion: --- Imports

// region:    --- Fixtures
#[allow(clippy::too_many_arguments)]
fn car(
    id: &str,
    make: &str,
    model: &str,
    year: i32,
    mileage: i64,
    condition: CarCondition,
    estimated_value: i64,
    owner: (&str, &str),
) -> Car {
    Car {
        id: id.to_string(),
        make: make.to_string(),
        model: model.to_string(),
        year,
        mileage,
        condition,
        images: vec![format!("/images/cars/{}-front.jpg", id)],
        estimated_value,
        owner_id: owner.0.to_string(),
        owner_name: owner.1.to_string(),
    }
}

fn bid(auction_id: &str, seq: u32, bidder: (&str, &str), amount: i64, at: DateTime<Utc>) -> Bid {
    Bid {
        id: format!("{}-bid-{}", auction_id, seq),
        auction_id: auction_id.to_string(),
        bidder_id: bidder.0.to_string(),
        bidder_name: bidder.1.to_string(),
        amount,
        timestamp: at,
        is_winning: false,
    }
}

/// 시드 차량 (경매에 올라간 차량 + 사용자 보유 차량)
pub fn seed_cars() -> Vec<Car> {
    vec![
        car(
            "car-1",
            "Porsche",
            "911 Carrera S",
            2021,
            12_400,
            CarCondition::Excellent,
            95_000,
            ("3", "Marco Ruiz"),
        ),
        car(
            "car-2",
            "BMW",
            "M4 Competition",
            2019,
            31_000,
            CarCondition::Good,
            52_000,
            ("4", "Lucia Fernandez"),
        ),
        car(
            "car-3",
            "Tesla",
            "Model S Plaid",
            2022,
            8_900,
            CarCondition::Excellent,
            88_000,
            ("5", "Andres Gil"),
        ),
        car(
            "car-4",
            "Ford",
            "Mustang GT",
            2018,
            54_000,
            CarCondition::Fair,
            34_000,
            ("6", "Sofia Vega"),
        ),
        car(
            "car-5",
            "Toyota",
            "GR Supra",
            2020,
            22_000,
            CarCondition::Good,
            48_000,
            ("user-9", "Dana Ortiz"),
        ),
    ]
}

/// 시드 경매
pub fn seed_auctions(now: DateTime<Utc>) -> Vec<Auction> {
    let cars = seed_cars();
    let car_by_id = |id: &str| cars.iter().find(|c| c.id == id).cloned();

    let mut auctions = Vec::new();

    if let Some(porsche) = car_by_id("car-1") {
        let mut auction = Auction {
            id: "auction-1".to_string(),
            seller_id: porsche.owner_id.clone(),
            seller_name: porsche.owner_name.clone(),
            car: porsche,
            start_price: 75_000,
            reserve_price: Some(90_000),
            current_bid: 75_000,
            bid_count: 0,
            highest_bidder_id: None,
            highest_bidder_name: None,
            start_time: now - Duration::days(2),
            end_time: now + Duration::hours(2),
            status: AuctionStatus::Active,
            bids: vec![],
            watchers: 14,
            is_watched: false,
        };
        auction.push_winning_bid(bid(
            "auction-1",
            1,
            ("user-5", "Pablo Rios"),
            78_000,
            now - Duration::days(1),
        ));
        auction.push_winning_bid(bid(
            "auction-1",
            2,
            ("user-7", "Elena Cruz"),
            82_000,
            now - Duration::hours(3),
        ));
        auctions.push(auction);
    }

    if let Some(bmw) = car_by_id("car-2") {
        auctions.push(Auction {
            id: "auction-2".to_string(),
            seller_id: bmw.owner_id.clone(),
            seller_name: bmw.owner_name.clone(),
            car: bmw,
            start_price: 45_000,
            reserve_price: None,
            current_bid: 45_000,
            bid_count: 0,
            highest_bidder_id: None,
            highest_bidder_name: None,
            start_time: now - Duration::hours(1),
            end_time: now + Duration::minutes(10),
            status: AuctionStatus::Active,
            bids: vec![],
            watchers: 6,
            is_watched: false,
        });
    }

    if let Some(tesla) = car_by_id("car-3") {
        auctions.push(Auction {
            id: "auction-3".to_string(),
            seller_id: tesla.owner_id.clone(),
            seller_name: tesla.owner_name.clone(),
            car: tesla,
            start_price: 70_000,
            reserve_price: Some(80_000),
            current_bid: 70_000,
            bid_count: 0,
            highest_bidder_id: None,
            highest_bidder_name: None,
            start_time: now + Duration::days(1),
            end_time: now + Duration::days(3),
            status: AuctionStatus::Upcoming,
            bids: vec![],
            watchers: 3,
            is_watched: false,
        });
    }

    if let Some(mustang) = car_by_id("car-4") {
        let mut auction = Auction {
            id: "auction-4".to_string(),
            seller_id: mustang.owner_id.clone(),
            seller_name: mustang.owner_name.clone(),
            car: mustang,
            start_price: 30_000,
            reserve_price: None,
            current_bid: 30_000,
            bid_count: 0,
            highest_bidder_id: None,
            highest_bidder_name: None,
            start_time: now - Duration::days(5),
            end_time: now - Duration::days(1),
            status: AuctionStatus::Active,
            bids: vec![],
            watchers: 9,
            is_watched: false,
        };
        auction.push_winning_bid(bid(
            "auction-4",
            1,
            ("user-2", "Tomas Leon"),
            36_500,
            now - Duration::days(2),
        ));
        auction.status = AuctionStatus::Ended;
        auctions.push(auction);
    }

    auctions
}
// endregion: --- Fixtures
