use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::db::DbPool;
use crate::domain::account::{Credentials, NewUser, ProfileUpdate, Role, User};
use crate::domain::errors::DomainError;
use crate::domain::ports::UserRepository;
use crate::schema::{orders, reviews, users};

use super::models::{NewUserRow, UserRow};
use super::review_repo::refresh_rating;

pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_credentials(row: UserRow) -> Result<Credentials, DomainError> {
    let (user, password_hash) = row.into_user()?;
    Ok(Credentials {
        user,
        password_hash,
    })
}

fn to_user(row: UserRow) -> Result<User, DomainError> {
    Ok(row.into_user()?.0)
}

/// Errors if `id` is an admin and no other admin would remain.
fn guard_last_admin(conn: &mut SqliteConnection, id: i32) -> Result<(), DomainError> {
    let role: String = users::table
        .find(id)
        .select(users::role)
        .first(conn)
        .optional()?
        .ok_or_else(|| DomainError::not_found("User", id))?;
    if role != Role::Admin.as_str() {
        return Ok(());
    }
    let admins: i64 = users::table
        .filter(users::role.eq(Role::Admin.as_str()))
        .count()
        .get_result(conn)?;
    if admins <= 1 {
        return Err(DomainError::Conflict(
            "the last admin account cannot be removed".to_string(),
        ));
    }
    Ok(())
}

impl UserRepository for DieselUserRepository {
    fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let mut conn = self.pool.get()?;

        let taken: bool = diesel::select(exists(users::table.filter(users::email.eq(&user.email))))
            .get_result(&mut conn)?;
        if taken {
            return Err(DomainError::Conflict(format!(
                "email {} is already registered",
                user.email
            )));
        }

        let row = diesel::insert_into(users::table)
            .values(&NewUserRow {
                email: &user.email,
                password_hash: &user.password_hash,
                name: &user.name,
                address: user.address.as_deref(),
                role: user.role.as_str(),
            })
            .returning(UserRow::as_returning())
            .get_result::<UserRow>(&mut conn)?;
        to_user(row)
    }

    fn find_by_id(&self, id: i32) -> Result<Option<User>, DomainError> {
        Ok(self.credentials_by_id(id)?.map(|c| c.user))
    }

    fn credentials_by_email(&self, email: &str) -> Result<Option<Credentials>, DomainError> {
        let mut conn = self.pool.get()?;

        users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(to_credentials)
            .transpose()
    }

    fn credentials_by_id(&self, id: i32) -> Result<Option<Credentials>, DomainError> {
        let mut conn = self.pool.get()?;

        users::table
            .find(id)
            .select(UserRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(to_credentials)
            .transpose()
    }

    fn update_profile(&self, id: i32, update: ProfileUpdate) -> Result<User, DomainError> {
        let mut conn = self.pool.get()?;

        let row = diesel::update(users::table.find(id))
            .set((
                users::name.eq(&update.name),
                users::address.eq(update.address.as_deref()),
            ))
            .returning(UserRow::as_returning())
            .get_result::<UserRow>(&mut conn)
            .optional()?
            .ok_or_else(|| DomainError::not_found("User", id))?;
        to_user(row)
    }

    fn update_password_hash(&self, id: i32, password_hash: &str) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        let updated = diesel::update(users::table.find(id))
            .set(users::password_hash.eq(password_hash))
            .execute(&mut conn)?;
        if updated == 0 {
            return Err(DomainError::not_found("User", id));
        }
        Ok(())
    }

    fn update_role(&self, id: i32, role: Role) -> Result<User, DomainError> {
        let mut conn = self.pool.get()?;

        conn.immediate_transaction::<_, DomainError, _>(|conn| {
            if role != Role::Admin {
                guard_last_admin(conn, id)?;
            }
            let row = diesel::update(users::table.find(id))
                .set(users::role.eq(role.as_str()))
                .returning(UserRow::as_returning())
                .get_result::<UserRow>(conn)
                .optional()?
                .ok_or_else(|| DomainError::not_found("User", id))?;
            to_user(row)
        })
    }

    fn list(&self) -> Result<Vec<User>, DomainError> {
        let mut conn = self.pool.get()?;

        users::table
            .order(users::id.asc())
            .select(UserRow::as_select())
            .load(&mut conn)?
            .into_iter()
            .map(to_user)
            .collect()
    }

    fn delete(&self, id: i32) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        conn.immediate_transaction::<_, DomainError, _>(|conn| {
            guard_last_admin(conn, id)?;
            // Reviews go with the user (directly and through their orders).
            let rated: Vec<i32> = reviews::table
                .filter(
                    reviews::user_id.eq(id).or(reviews::order_id.eq_any(
                        orders::table.filter(orders::user_id.eq(id)).select(orders::id),
                    )),
                )
                .select(reviews::product_id)
                .distinct()
                .load(conn)?;
            diesel::delete(users::table.find(id)).execute(conn)?;
            for product_id in rated {
                refresh_rating(conn, product_id)?;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use diesel::prelude::*;

    use super::DieselUserRepository;
    use crate::domain::account::{NewUser, ProfileUpdate, Role};
    use crate::domain::errors::DomainError;
    use crate::domain::order::{NewOrder, OrderItemInput, OrderStatus};
    use crate::domain::ports::{CatalogRepository, OrderRepository, ReviewRepository, UserRepository};
    use crate::domain::review::NewReview;
    use crate::domain::stock::LedgerSummary;
    use crate::infrastructure::catalog_repo::DieselCatalogRepository;
    use crate::infrastructure::order_repo::DieselOrderRepository;
    use crate::infrastructure::review_repo::DieselReviewRepository;
    use crate::infrastructure::test_support::{price, TestDb};
    use crate::schema::products;

    fn new_user(email: &str, role: Role) -> NewUser {
        NewUser {
            email: email.into(),
            password_hash: "hash".into(),
            name: "Alice".into(),
            address: Some("123 St".into()),
            role,
        }
    }

    #[test]
    fn duplicate_email_is_a_conflict() {
        let db = TestDb::new();
        let repo = DieselUserRepository::new(db.pool.clone());
        repo.create(new_user("alice@example.com", Role::Customer)).unwrap();

        let err = repo
            .create(new_user("alice@example.com", Role::Customer))
            .unwrap_err();

        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn credentials_carry_the_hash() {
        let db = TestDb::new();
        let repo = DieselUserRepository::new(db.pool.clone());
        let user = repo.create(new_user("alice@example.com", Role::Customer)).unwrap();

        let creds = repo.credentials_by_email("alice@example.com").unwrap().unwrap();
        assert_eq!(creds.user, user);
        assert_eq!(creds.password_hash, "hash");
        assert!(repo.credentials_by_email("nobody@example.com").unwrap().is_none());
    }

    #[test]
    fn profile_update_changes_name_and_address() {
        let db = TestDb::new();
        let repo = DieselUserRepository::new(db.pool.clone());
        let user = repo.create(new_user("alice@example.com", Role::Customer)).unwrap();

        let updated = repo
            .update_profile(
                user.id,
                ProfileUpdate {
                    name: "Alice B".into(),
                    address: None,
                },
            )
            .unwrap();

        assert_eq!(updated.name, "Alice B");
        assert_eq!(updated.address, None);
        assert_eq!(updated.role, Role::Customer);
    }

    #[test]
    fn last_admin_is_protected() {
        let db = TestDb::new();
        let repo = DieselUserRepository::new(db.pool.clone());
        let admin = repo.create(new_user("root@example.com", Role::Admin)).unwrap();
        let customer = repo.create(new_user("alice@example.com", Role::Customer)).unwrap();

        assert!(matches!(repo.delete(admin.id), Err(DomainError::Conflict(_))));
        assert!(matches!(
            repo.update_role(admin.id, Role::Customer),
            Err(DomainError::Conflict(_))
        ));

        repo.update_role(customer.id, Role::Admin).unwrap();
        repo.delete(admin.id).unwrap();
        assert!(repo.find_by_id(admin.id).unwrap().is_none());
        assert_eq!(repo.list().unwrap().len(), 1);
    }

    #[test]
    fn deleting_unknown_user_is_not_found() {
        let db = TestDb::new();
        let repo = DieselUserRepository::new(db.pool.clone());
        assert!(matches!(repo.delete(5), Err(DomainError::NotFound(_))));
    }

    #[test]
    fn deleting_a_user_refreshes_ratings_and_keeps_the_ledger() {
        let db = TestDb::new();
        let users = DieselUserRepository::new(db.pool.clone());
        let orders = DieselOrderRepository::new(db.pool.clone());
        let reviews = DieselReviewRepository::new(db.pool.clone());
        let user = db.insert_user("alice@example.com", "customer");
        let lamp = db.insert_product("Lamp", "100", 10);

        let order_id = orders
            .create(
                NewOrder::validate(
                    user,
                    "Alice",
                    "123 St",
                    vec![OrderItemInput {
                        product_id: lamp,
                        quantity: 3,
                        price: price("100"),
                    }],
                )
                .unwrap(),
            )
            .unwrap();
        let after_create = db.stock_of(lamp);
        orders.update_status(order_id, OrderStatus::Paid).unwrap();
        orders.update_status(order_id, OrderStatus::Delivered).unwrap();
        reviews
            .add(NewReview {
                order_id,
                product_id: lamp,
                user_id: user,
                rating: 4,
                comment: None,
                is_anonymous: false,
            })
            .unwrap();

        users.delete(user).unwrap();

        let rating: (f64, i32) = products::table
            .find(lamp)
            .select((products::rating_rate, products::rating_count))
            .first(&mut db.conn())
            .unwrap();
        assert_eq!(rating, (0.0, 0));
        assert_eq!(db.order_count(), 0);

        let movements = orders.movements_for_product(lamp).unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].order_id, None);
        let ledger = LedgerSummary::from_movements(&movements);
        assert_eq!(
            i64::from(after_create) + ledger.net(),
            i64::from(db.stock_of(lamp))
        );

        let catalog = DieselCatalogRepository::new(db.pool.clone());
        assert!(matches!(
            catalog.delete_product(lamp),
            Err(DomainError::Conflict(_))
        ));
    }
}
