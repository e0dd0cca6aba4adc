#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    use crate::api_error::ApiError;
    use crate::models::{Match, MatchStatus, Player};
    use crate::rank::{arbitrate_grandmaster, Candidate, Tier, GRANDMASTER_FLOOR};
    use crate::rating;

    fn member(elo: i32) -> Player {
        let mut p = Player::new(
            Uuid::new_v4().to_string(),
            Uuid::new_v4(),
            "player".to_string(),
            Utc::now(),
        );
        p.elo = elo;
        p.rank = Tier::classify(elo);
        p
    }

    /// Drive a full instant-match lifecycle against in-memory rows, the
    /// same sequence the service runs inside its transaction.
    fn play_out(
        winner: &mut Player,
        loser: &mut Player,
        player1_score: i32,
        player2_score: i32,
    ) -> Match {
        let mut m = Match::create(winner.league_id, winner.id, loser.id, None, Utc::now());
        m.confirm(loser.id, Utc::now()).unwrap();

        let outcome = m
            .record_result(winner.id, player1_score, player2_score, Utc::now())
            .unwrap();
        assert_eq!(outcome.winner_id, winner.id);

        let update = rating::apply(winner.elo, loser.elo);
        m.elo_delta = Some(update.delta);

        winner.elo = update.winner_elo;
        winner.rank = Tier::classify(winner.elo);
        winner.wins += 1;

        loser.elo = update.loser_elo;
        loser.rank = Tier::classify(loser.elo);
        loser.losses += 1;

        m
    }

    #[test]
    fn even_instant_match_moves_sixteen_points() {
        let league = Uuid::new_v4();
        let mut a = member(1000);
        let mut b = member(1000);
        a.league_id = league;
        b.league_id = league;

        let m = play_out(&mut a, &mut b, 1, 0);

        assert_eq!(m.status, MatchStatus::Completed);
        assert_eq!(m.elo_delta, Some(16));
        assert_eq!(a.elo, 1016);
        assert_eq!(b.elo, 984);
        assert_eq!(a.rank, Tier::Bronze);
        assert_eq!(b.rank, Tier::Bronze);
        assert_eq!((a.wins, a.losses), (1, 0));
        assert_eq!((b.wins, b.losses), (0, 1));
    }

    #[test]
    fn underdog_win_carries_the_upset_bonus() {
        let mut favorite = member(2100);
        let mut underdog = member(1200);
        underdog.league_id = favorite.league_id;

        // Underdog occupies seat 1 and wins.
        let m = play_out(&mut underdog, &mut favorite, 2, 1);

        assert_eq!(m.elo_delta, Some(48));
        assert_eq!(underdog.elo, 1248);
        assert_eq!(favorite.elo, 2052);
    }

    #[test]
    fn arbitration_keeps_one_grandmaster_as_ratings_move() {
        let league = Uuid::new_v4();
        let mut contenders: Vec<Player> = (0..3).map(|_| member(2150)).collect();
        for p in &mut contenders {
            p.league_id = league;
        }
        contenders[0].elo = 2250;
        contenders[1].elo = 2240;
        contenders[2].elo = 2100;

        let candidates: Vec<Candidate> = contenders
            .iter()
            .filter(|p| p.elo >= GRANDMASTER_FLOOR)
            .map(|p| Candidate { id: p.id, elo: p.elo, joined_at: p.joined_at })
            .collect();
        assert_eq!(candidates.len(), 2);

        for assignment in arbitrate_grandmaster(&candidates) {
            let p = contenders.iter_mut().find(|p| p.id == assignment.id).unwrap();
            p.rank = assignment.tier;
        }

        assert_eq!(contenders[0].rank, Tier::Grandmaster);
        // 2240 is in the band but loses arbitration and reverts to Master.
        assert_eq!(contenders[1].rank, Tier::Master);
        assert_eq!(contenders[2].rank, Tier::Master);

        let grandmasters = contenders.iter().filter(|p| p.rank == Tier::Grandmaster).count();
        assert_eq!(grandmasters, 1);
    }

    #[test]
    fn dethroned_grandmaster_is_demoted_without_playing() {
        let league = Uuid::new_v4();
        let mut champion = member(2255);
        champion.rank = Tier::Grandmaster;
        let mut challenger = member(2250);
        challenger.rank = Tier::Master;
        let mut victim = member(2000);
        for p in [&mut champion, &mut challenger, &mut victim] {
            p.league_id = league;
        }

        // Challenger beats an uninvolved third player and overtakes the
        // champion on rating.
        play_out(&mut challenger, &mut victim, 3, 0);
        assert!(challenger.elo > champion.elo);

        let mut roster = [champion, challenger, victim];
        let candidates: Vec<Candidate> = roster
            .iter()
            .filter(|p| p.elo >= GRANDMASTER_FLOOR)
            .map(|p| Candidate { id: p.id, elo: p.elo, joined_at: p.joined_at })
            .collect();

        for assignment in arbitrate_grandmaster(&candidates) {
            let p = roster.iter_mut().find(|p| p.id == assignment.id).unwrap();
            p.rank = assignment.tier;
        }

        // The former champion did not play but still lost the title.
        assert_eq!(roster[0].rank, Tier::Master);
        assert_eq!(roster[1].rank, Tier::Grandmaster);
    }

    #[test]
    fn rejected_report_leaves_players_untouched() {
        let league = Uuid::new_v4();
        let mut a = member(1500);
        let mut b = member(1500);
        a.league_id = league;
        b.league_id = league;

        let mut m = Match::create(league, a.id, b.id, None, Utc::now());

        // Opponent never confirmed the instant match.
        let err = m.record_result(a.id, 1, 0, Utc::now()).unwrap_err();
        assert!(matches!(err, ApiError::NotConfirmed));

        // No effect reaches the players or the match row.
        assert_eq!(m.status, MatchStatus::Scheduled);
        assert_eq!((a.elo, a.wins, a.losses), (1500, 0, 0));
        assert_eq!((b.elo, b.wins, b.losses), (1500, 0, 0));
    }

    #[test]
    fn duplicate_confirm_never_double_applies() {
        let mut m = Match::create(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), None, Utc::now());
        let p2 = m.player2_id;

        m.confirm(p2, Utc::now()).unwrap();
        let snapshot = m.clone();

        m.confirm(p2, Utc::now() + Duration::minutes(1)).unwrap();
        assert_eq!(m.scheduled_date, snapshot.scheduled_date);
        assert_eq!(m.player1_confirmed, snapshot.player1_confirmed);
        assert_eq!(m.player2_confirmed, snapshot.player2_confirmed);
        assert_eq!(m.status, snapshot.status);
    }

    #[test]
    fn floor_holds_across_repeated_losses() {
        let league = Uuid::new_v4();
        let mut shark = member(400);
        let mut minnow = member(40);
        shark.league_id = league;
        minnow.league_id = league;

        for _ in 0..25 {
            play_out(&mut shark, &mut minnow, 1, 0);
        }

        // The repeated deltas exceed the starting 40 points, so the loser
        // bottoms out at the floor instead of going non-positive.
        assert_eq!(minnow.elo, 1);
        assert_eq!(minnow.losses, 25);
        assert_eq!(minnow.rank, Tier::Bronze);
    }
}
