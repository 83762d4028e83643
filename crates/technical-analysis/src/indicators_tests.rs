#[cfg(test)]
mod tests {
    use super::super::indicators::*;
    use analysis_core::Bar;
    use chrono::Utc;

    // Helper function to create sample price data
    fn sample_prices() -> Vec<f64> {
        vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08,
            45.89, 46.03, 45.61, 46.28, 46.28, 46.00, 46.03, 46.41, 46.22, 45.64,
        ]
    }

    // Helper function to create sample bars
    fn sample_bars() -> Vec<Bar> {
        let prices = vec![
            (100.0, 102.0, 99.0, 101.0),
            (101.0, 103.0, 100.0, 102.0),
            (102.0, 104.0, 101.0, 103.0),
            (103.0, 105.0, 102.0, 104.0),
            (104.0, 106.0, 103.0, 105.0),
            (105.0, 107.0, 104.0, 106.0),
            (106.0, 108.0, 105.0, 107.0),
            (107.0, 109.0, 106.0, 108.0),
            (108.0, 110.0, 107.0, 109.0),
            (109.0, 111.0, 108.0, 110.0),
            (110.0, 112.0, 109.0, 111.0),
            (111.0, 113.0, 110.0, 112.0),
            (112.0, 114.0, 111.0, 113.0),
            (113.0, 115.0, 112.0, 114.0),
            (114.0, 116.0, 113.0, 115.0),
        ];

        prices
            .into_iter()
            .enumerate()
            .map(|(i, (open, high, low, close))| Bar {
                timestamp: Utc::now() - chrono::Duration::days(15 - i as i64),
                open,
                high,
                low,
                close,
                volume: 1000000.0,
            })
            .collect()
    }

    #[test]
    fn test_sma_basic() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = sma(&data, 3);

        assert_eq!(result.len(), 3);
        assert!((result[0] - 2.0).abs() < 0.001); // (1+2+3)/3 = 2
        assert!((result[1] - 3.0).abs() < 0.001); // (2+3+4)/3 = 3
        assert!((result[2] - 4.0).abs() < 0.001); // (3+4+5)/3 = 4
    }

    #[test]
    fn test_sma_insufficient_data() {
        let data = vec![1.0, 2.0];
        assert!(sma(&data, 5).is_empty());
    }

    #[test]
    fn test_ema_seeded_with_first_value() {
        let data = vec![22.0, 24.0, 23.0, 25.0, 26.0];
        let result = ema(&data, 3);

        assert_eq!(result.len(), data.len());
        let expected = [22.0, 23.0, 23.0, 24.0, 25.0];
        for (got, want) in result.iter().zip(expected.iter()) {
            assert!((got - want).abs() < 0.001);
        }
    }

    #[test]
    fn test_ema_empty_data() {
        let data: Vec<f64> = vec![];
        assert!(ema(&data, 5).is_empty());
    }

    #[test]
    fn test_rsi_rolling_window_values() {
        let result = rsi(&sample_prices(), 14);

        // 19 changes, 14-session window
        assert_eq!(result.len(), 6);
        assert!((result[0] - 70.464).abs() < 0.01);
        assert!((result[5] - 59.806).abs() < 0.01);
    }

    #[test]
    fn test_rsi_bounded() {
        let mut prices = Vec::new();
        let mut p = 100.0;
        for i in 0..300 {
            p += ((i * 37 % 11) as f64 - 5.0) * 0.7;
            prices.push(p);
        }
        for value in rsi(&prices, 14) {
            assert!((0.0..=100.0).contains(&value));
        }
    }

    #[test]
    fn test_rsi_zero_loss_window() {
        let uptrend: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        assert_eq!(rsi(&uptrend, 14).last(), Some(&100.0));

        let flat = vec![100.0; 20];
        assert_eq!(rsi(&flat, 14).last(), Some(&50.0));

        let downtrend: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
        assert_eq!(rsi(&downtrend, 14).last(), Some(&0.0));
    }

    #[test]
    fn test_rsi_insufficient_data() {
        let data = vec![1.0, 2.0, 3.0];
        assert!(rsi(&data, 14).is_empty());
    }

    #[test]
    fn test_macd_lengths_and_histogram() {
        let prices = sample_prices();
        let result = macd(&prices, 12, 26, 9);

        assert_eq!(result.macd_line.len(), prices.len());
        assert_eq!(result.signal_line.len(), prices.len());
        for i in 0..result.histogram.len() {
            let expected = result.macd_line[i] - result.signal_line[i];
            assert!((result.histogram[i] - expected).abs() < 0.001);
        }
    }

    #[test]
    fn test_macd_rejects_bad_periods() {
        let result = macd(&sample_prices(), 26, 12, 9);
        assert!(result.last().is_none());
    }

    #[test]
    fn test_mfi_all_up_sessions() {
        let result = mfi(&sample_bars(), 14);
        assert_eq!(result, vec![100.0]);
    }

    #[test]
    fn test_mfi_mixed_flow_bounded() {
        let mut bars = sample_bars();
        for (i, bar) in bars.iter_mut().enumerate() {
            if i % 3 == 0 {
                bar.high -= 4.0;
                bar.low -= 4.0;
                bar.close -= 4.0;
            }
        }
        let result = mfi(&bars, 5);
        assert!(!result.is_empty());
        for value in result {
            assert!(value > 0.0 && value < 100.0);
        }
    }

    #[test]
    fn test_moving_averages_short_series() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let ma = moving_averages(&closes).unwrap();

        assert_eq!(ma.current_price, 159.0);
        assert_eq!(ma.ma_20, Some(149.5));
        assert_eq!(ma.ma_50, Some(134.5));
        assert_eq!(ma.ma_200, None);
        assert_eq!(ma.above_50, Some(true));
        assert_eq!(ma.above_200, None);
    }

    #[test]
    fn test_pivot_levels() {
        let levels = pivot_levels(&sample_bars(), 20).unwrap();

        assert_eq!(levels.high_52w, 116.0);
        assert_eq!(levels.low_52w, 99.0);
        assert_eq!(levels.pivot, 110.0);
        assert_eq!(levels.immediate_support, 104.0);
        assert_eq!(levels.immediate_resistance, 121.0);
        assert_eq!(levels.strong_support, 93.0);
        assert_eq!(levels.strong_resistance, 127.0);
        assert_eq!(levels.distance_from_high_pct, 0.87);
        assert_eq!(levels.distance_from_low_pct, 16.16);
    }

    #[test]
    fn test_pivot_levels_use_recent_window_only() {
        let bars = sample_bars();
        let levels = pivot_levels(&bars, 5).unwrap();
        // last five sessions: high 116, low 109, close 115
        assert_eq!(levels.pivot, 113.33);
        assert_eq!(levels.high_52w, 116.0);
        assert_eq!(levels.low_52w, 99.0);
    }

    #[test]
    fn test_volume_stats() {
        let mut bars = sample_bars();
        let last = bars.len() - 1;
        bars[last].volume = 2_000_000.0;
        let stats = volume_stats(&bars).unwrap();

        assert_eq!(stats.avg_10, 1_100_000.0);
        assert_eq!(stats.ratio, 1.82);
        assert!(stats.above_average);
    }

    #[test]
    fn test_volume_stats_zero_average() {
        let mut bars = sample_bars();
        for bar in &mut bars {
            bar.volume = 0.0;
        }
        let stats = volume_stats(&bars).unwrap();
        assert_eq!(stats.ratio, 0.0);
        assert!(stats.above_average);
    }

    #[test]
    fn test_risk_reward() {
        let rrr = risk_reward(100.0, 96.0, 106.0);
        assert!(rrr.valid);
        assert_eq!(rrr.ratio, 1.5);
        assert_eq!(rrr.risk_pct, 4.0);
        assert_eq!(rrr.reward_pct, 6.0);
    }

    #[test]
    fn test_risk_reward_price_below_support() {
        let rrr = risk_reward(95.0, 96.0, 106.0);
        assert!(!rrr.valid);
        assert_eq!(rrr.ratio, 0.0);

        let rrr = risk_reward(96.0, 96.0, 106.0);
        assert!(!rrr.valid);
    }
}
