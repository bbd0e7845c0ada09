table! {
    admin_logins (token) {
        token -> Text,
        admin_id -> Integer,
        login_time -> Timestamp,
    }
}

table! {
    administrators (id) {
        id -> Integer,
        name -> Text,
        email -> Text,
        password -> Text,
        role -> Text,
    }
}

table! {
    achievements (id) {
        id -> Integer,
        title -> Text,
        description -> Text,
        student_name -> Text,
        date -> Date,
        photo_public_id -> Text,
        photo_url -> Text,
        created_at -> Timestamp,
    }
}

table! {
    staff (id) {
        id -> Integer,
        staff_id -> Integer,
        name -> Text,
        designation -> Text,
        dob -> Date,
        join_date -> Nullable<Date>,
        leave_date -> Nullable<Date>,
        guardian_name -> Text,
        address -> Text,
        work_duration -> Text,
        gender -> Text,
        qualification -> Text,
        photo_public_id -> Nullable<Text>,
        photo_url -> Nullable<Text>,
    }
}

table! {
    students (id) {
        id -> Integer,
        roll_no -> Text,
        full_name -> Text,
        gender -> Text,
        guardian_name -> Text,
        phone_number -> Text,
        dob -> Date,
        joining_date -> Date,
        farewell_date -> Nullable<Date>,
        course -> Text,
        course_duration -> Text,
        address -> Text,
        certificate -> Bool,
        photo_public_id -> Nullable<Text>,
        photo_url -> Nullable<Text>,
    }
}

joinable!(admin_logins -> administrators (admin_id));

allow_tables_to_appear_in_same_query!(
    admin_logins,
    administrators,
    achievements,
    staff,
    students,
);
