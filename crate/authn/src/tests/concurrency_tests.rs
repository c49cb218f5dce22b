use std::thread;

use crate::{
    result::AResult,
    tests::test_utils::{memory_config, token_authenticator},
};

#[test]
fn test_verification_during_rotations() -> AResult<()> {
    let authenticator = token_authenticator(&memory_config("HS256"))?;
    let initial = authenticator.generate_token("frodo")?;

    // 1 + 3 keys never exceed the default ring size of 5: nothing is evicted
    thread::scope(|s| -> AResult<()> {
        let renewer = s.spawn(|| -> AResult<()> {
            for _ in 0..3 {
                authenticator.renew_signing_key()?;
                thread::yield_now();
            }
            Ok(())
        });
        let workers = (0..4)
            .map(|i| {
                let authenticator = &authenticator;
                let initial = &initial;
                s.spawn(move || -> AResult<()> {
                    let principal = format!("hobbit-{i}");
                    for _ in 0..50 {
                        let token = authenticator.generate_token(&principal)?;
                        assert_eq!(authenticator.verify(token.data())?, principal);
                        assert_eq!(authenticator.verify(initial.data())?, "frodo");
                    }
                    Ok(())
                })
            })
            .collect::<Vec<_>>();

        for worker in workers {
            worker.join().map_err(|_| crate::authn_error!("worker panicked"))??;
        }
        renewer.join().map_err(|_| crate::authn_error!("renewer panicked"))??;
        Ok(())
    })?;

    assert_eq!(authenticator.current_key_list_size()?, 4);
    Ok(())
}

#[test]
fn test_concurrent_issuance_after_revoke_creates_one_key() -> AResult<()> {
    let authenticator = token_authenticator(&memory_config("HS384"))?;
    authenticator.revoke_signing_keys()?;

    let tokens = thread::scope(|s| -> AResult<Vec<String>> {
        let handles = (0..8)
            .map(|_| s.spawn(|| authenticator.generate_token("sam")))
            .collect::<Vec<_>>();
        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .map_err(|_| crate::authn_error!("issuer panicked"))?
                    .map(crate::Token::into_data)
            })
            .collect()
    })?;

    assert_eq!(authenticator.current_key_list_size()?, 1);
    for token in &tokens {
        assert_eq!(authenticator.verify(token)?, "sam");
    }
    Ok(())
}

#[test]
fn test_eviction_under_load_never_corrupts_reads() -> AResult<()> {
    let mut config = memory_config("HS256");
    config.max_in_memory_keys = 2;
    let authenticator = token_authenticator(&config)?;

    thread::scope(|s| -> AResult<()> {
        let renewer = s.spawn(|| -> AResult<()> {
            for _ in 0..100 {
                authenticator.renew_signing_key()?;
            }
            Ok(())
        });
        let reader = s.spawn(|| -> AResult<()> {
            for _ in 0..200 {
                let size = authenticator.current_key_list_size()?;
                assert!((1..=2).contains(&size));
                let token = authenticator.generate_token("pippin")?;
                // the signing key may be evicted right after issuance, but the
                // outcome is always a clean verification or an unknown key
                if let Err(e) = authenticator.verify(token.data()) {
                    assert!(matches!(
                        e.verification_failure(),
                        Some(crate::VerificationFailure::UnknownKey(_))
                    ));
                }
            }
            Ok(())
        });
        renewer.join().map_err(|_| crate::authn_error!("renewer panicked"))??;
        reader.join().map_err(|_| crate::authn_error!("reader panicked"))??;
        Ok(())
    })?;

    assert_eq!(authenticator.current_key_list_size()?, 2);
    Ok(())
}
